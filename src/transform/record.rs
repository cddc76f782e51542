//! The fixed field set pulled out of each terminated record

use serde::{Deserialize, Serialize};

/// One of the six extracted sub-fields of a `TermntdRcrd`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// `FinInstrmGnlAttrbts/Id` (ISIN)
    Id,
    /// `FinInstrmGnlAttrbts/FullNm`
    FullName,
    /// `FinInstrmGnlAttrbts/ClssfctnTp` (CFI code)
    ClassificationType,
    /// `FinInstrmGnlAttrbts/CmmdtyDerivInd`
    CommodityDerivativeIndicator,
    /// `FinInstrmGnlAttrbts/NtnlCcy`
    NotionalCurrency,
    /// `Issr` (issuer LEI)
    Issuer,
}

impl Field {
    /// All fields, in output column order
    pub const ALL: [Field; 6] = [
        Field::Id,
        Field::FullName,
        Field::ClassificationType,
        Field::CommodityDerivativeIndicator,
        Field::NotionalCurrency,
        Field::Issuer,
    ];

    /// Element path relative to the record element
    pub fn path(self) -> &'static [&'static str] {
        match self {
            Field::Id => &["FinInstrmGnlAttrbts", "Id"],
            Field::FullName => &["FinInstrmGnlAttrbts", "FullNm"],
            Field::ClassificationType => &["FinInstrmGnlAttrbts", "ClssfctnTp"],
            Field::CommodityDerivativeIndicator => &["FinInstrmGnlAttrbts", "CmmdtyDerivInd"],
            Field::NotionalCurrency => &["FinInstrmGnlAttrbts", "NtnlCcy"],
            Field::Issuer => &["Issr"],
        }
    }

    /// CSV column name: the path joined with dots
    pub fn column(self) -> &'static str {
        match self {
            Field::Id => "FinInstrmGnlAttrbts.Id",
            Field::FullName => "FinInstrmGnlAttrbts.FullNm",
            Field::ClassificationType => "FinInstrmGnlAttrbts.ClssfctnTp",
            Field::CommodityDerivativeIndicator => "FinInstrmGnlAttrbts.CmmdtyDerivInd",
            Field::NotionalCurrency => "FinInstrmGnlAttrbts.NtnlCcy",
            Field::Issuer => "Issr",
        }
    }

    /// Position in [`Field::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The field whose path is exactly `path`, if any
    pub fn at_path<S: AsRef<str>>(path: &[S]) -> Option<Field> {
        Field::ALL.into_iter().find(|field| {
            let expected = field.path();
            expected.len() == path.len()
                && expected.iter().zip(path).all(|(a, b)| *a == b.as_ref())
        })
    }
}

/// Extracted values of one terminated record; `None` when absent
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    /// Instrument identifier
    pub id: Option<String>,
    /// Full instrument name
    pub full_name: Option<String>,
    /// Classification type
    pub classification_type: Option<String>,
    /// Commodity derivative indicator
    pub commodity_derivative_indicator: Option<String>,
    /// Notional currency
    pub notional_currency: Option<String>,
    /// Issuer
    pub issuer: Option<String>,
}

impl InstrumentRecord {
    /// Value of `field`
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Set `field` unless it already holds a value (first match wins)
    ///
    /// Returns whether the value was stored.
    pub fn set_first(&mut self, field: Field, value: String) -> bool {
        let slot = self.slot_mut(field);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Id => &self.id,
            Field::FullName => &self.full_name,
            Field::ClassificationType => &self.classification_type,
            Field::CommodityDerivativeIndicator => &self.commodity_derivative_indicator,
            Field::NotionalCurrency => &self.notional_currency,
            Field::Issuer => &self.issuer,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Id => &mut self.id,
            Field::FullName => &mut self.full_name,
            Field::ClassificationType => &mut self.classification_type,
            Field::CommodityDerivativeIndicator => &mut self.commodity_derivative_indicator,
            Field::NotionalCurrency => &mut self.notional_currency,
            Field::Issuer => &mut self.issuer,
        }
    }
}
