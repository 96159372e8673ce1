use crate::error::ChargeError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Stable identity of a charge line within its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChargeLineId(Uuid);

impl ChargeLineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ChargeLineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChargeLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The editable fields of a [`ChargeLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeField {
    Description,
    Quantity,
    UnitPrice,
}

impl fmt::Display for ChargeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChargeField::Description => "description",
            ChargeField::Quantity => "quantity",
            ChargeField::UnitPrice => "unit price",
        })
    }
}

/// A replacement value for one field of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeUpdate {
    Description(String),
    Quantity(Decimal),
    UnitPrice(Decimal),
}

impl ChargeUpdate {
    pub fn field(&self) -> ChargeField {
        match self {
            ChargeUpdate::Description(_) => ChargeField::Description,
            ChargeUpdate::Quantity(_) => ChargeField::Quantity,
            ChargeUpdate::UnitPrice(_) => ChargeField::UnitPrice,
        }
    }
}

/// One row of a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeLine {
    id: ChargeLineId,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
}

impl ChargeLine {
    fn blank(description: impl Into<String>) -> Self {
        Self {
            id: ChargeLineId::new(),
            description: description.into(),
            quantity: Decimal::ONE,
            unit_price: Decimal::ZERO,
        }
    }

    /// `quantity × unit_price`, or `None` when the product overflows.
    pub fn checked_subtotal(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }

    /// `quantity × unit_price`.
    ///
    /// Lines held by a [`ChargeList`] never overflow. A line built elsewhere
    /// (deserialized, for one) saturates at [`Decimal::MAX`].
    pub fn subtotal(&self) -> Decimal {
        self.quantity.saturating_mul(self.unit_price)
    }

    pub fn id(&self) -> ChargeLineId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

/// Ordered list of charge lines that is never empty.
///
/// The grand total always fits in a [`Decimal`]: an edit that would overflow
/// it is rejected with [`ChargeError::Overflow`] and leaves the list unchanged.
///
/// Edits address lines by id. A line keeps its position and id across
/// updates, so one row can change without disturbing the others.
///
/// # Examples
///
/// ```
/// use duty_engine::quotation::charges::{ChargeList, ChargeUpdate};
/// use rust_decimal_macros::dec;
///
/// let mut list = ChargeList::new();
/// let first = list.lines()[0].id();
/// list.update_line(first, ChargeUpdate::UnitPrice(dec!(5000))).unwrap();
/// list.push_line("Clearing", dec!(2), dec!(1500)).unwrap();
///
/// assert_eq!(list.grand_total(), dec!(8000));
/// assert!(list.remove_line(first).is_ok());
/// assert_eq!(list.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeList {
    lines: Vec<ChargeLine>,
}

impl ChargeList {
    /// A list holding one blank line.
    pub fn new() -> Self {
        Self {
            lines: vec![ChargeLine::blank("")],
        }
    }

    /// Append a line with quantity 1 and unit price 0.
    pub fn add_line(&mut self, description: impl Into<String>) -> ChargeLineId {
        let line = ChargeLine::blank(description);
        let id = line.id;
        log::trace!("added charge line {}", id);
        self.lines.push(line);
        id
    }

    /// Append a fully specified line.
    pub fn push_line(
        &mut self,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<ChargeLineId, ChargeError> {
        check_non_negative(ChargeField::Quantity, quantity)?;
        check_non_negative(ChargeField::UnitPrice, unit_price)?;

        let mut line = ChargeLine::blank(description);
        line.quantity = quantity;
        line.unit_price = unit_price;
        let id = line.id;
        self.lines.push(line);
        if self.checked_grand_total().is_none() {
            self.lines.pop();
            let (field, value) = overflow_culprit(quantity, unit_price);
            return Err(ChargeError::Overflow { field, value });
        }
        Ok(id)
    }

    /// Replace one field of the line with `id`.
    pub fn update_line(&mut self, id: ChargeLineId, update: ChargeUpdate) -> Result<(), ChargeError> {
        match &update {
            ChargeUpdate::Quantity(v) | ChargeUpdate::UnitPrice(v) => {
                check_non_negative(update.field(), *v)?
            }
            ChargeUpdate::Description(_) => {}
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(ChargeError::NotFound(id))?;

        log::trace!("updating {} of charge line {}", update.field(), id);
        let previous = line.clone();
        let field = update.field();
        let value = match update {
            ChargeUpdate::Description(d) => {
                line.description = d;
                return Ok(());
            }
            ChargeUpdate::Quantity(q) => {
                line.quantity = q;
                q
            }
            ChargeUpdate::UnitPrice(p) => {
                line.unit_price = p;
                p
            }
        };

        if self.checked_grand_total().is_none() {
            if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
                *line = previous;
            }
            return Err(ChargeError::Overflow { field, value });
        }
        Ok(())
    }

    /// Remove the line with `id`. The last remaining line cannot be removed.
    pub fn remove_line(&mut self, id: ChargeLineId) -> Result<ChargeLine, ChargeError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == id)
            .ok_or(ChargeError::NotFound(id))?;
        if self.lines.len() == 1 {
            return Err(ChargeError::LastLine);
        }
        log::trace!("removed charge line {}", id);
        Ok(self.lines.remove(index))
    }

    pub fn line(&self, id: ChargeLineId) -> Option<&ChargeLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn lines(&self) -> &[ChargeLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of every line's subtotal.
    pub fn grand_total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.subtotal()))
    }

    fn checked_grand_total(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.checked_subtotal()?))
    }
}

impl Default for ChargeList {
    fn default() -> Self {
        Self::new()
    }
}

/// The larger of the two factors is reported as the cause.
fn overflow_culprit(quantity: Decimal, unit_price: Decimal) -> (ChargeField, Decimal) {
    if quantity > unit_price {
        (ChargeField::Quantity, quantity)
    } else {
        (ChargeField::UnitPrice, unit_price)
    }
}

fn check_non_negative(field: ChargeField, value: Decimal) -> Result<(), ChargeError> {
    if value < Decimal::ZERO {
        return Err(ChargeError::Negative { field, value });
    }
    Ok(())
}

/// Cloneable handle to a [`ChargeList`] shared between event sources.
///
/// Each operation holds the lock for its whole duration, so edits to
/// different lines from different threads are applied one at a time and
/// none are lost.
#[derive(Debug, Clone, Default)]
pub struct SharedChargeList {
    inner: Arc<Mutex<ChargeList>>,
}

impl SharedChargeList {
    pub fn new(list: ChargeList) -> Self {
        Self {
            inner: Arc::new(Mutex::new(list)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChargeList> {
        // Every mutation completes or returns early before it can panic, so a
        // poisoned list is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_line(&self, description: impl Into<String>) -> ChargeLineId {
        self.lock().add_line(description)
    }

    pub fn push_line(
        &self,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<ChargeLineId, ChargeError> {
        self.lock().push_line(description, quantity, unit_price)
    }

    pub fn update_line(&self, id: ChargeLineId, update: ChargeUpdate) -> Result<(), ChargeError> {
        self.lock().update_line(id, update)
    }

    pub fn remove_line(&self, id: ChargeLineId) -> Result<ChargeLine, ChargeError> {
        self.lock().remove_line(id)
    }

    pub fn grand_total(&self) -> Decimal {
        self.lock().grand_total()
    }

    /// A consistent copy of the current list.
    pub fn snapshot(&self) -> ChargeList {
        self.lock().clone()
    }
}
