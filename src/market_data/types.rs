use serde::{Deserialize, Serialize};

/// A numeric field the upstream API encodes inconsistently: some instruments
/// arrive as JSON numbers, others as numeric strings (sometimes with
/// thousands separators). The raw encoding is kept so the cache round-trips
/// faithfully; arithmetic goes through [`RawNumber::as_f64`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().replace(',', "").parse().ok(),
        }
    }
}

impl std::fmt::Display for RawNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawNumber::Number(n) => write!(f, "{n}"),
            RawNumber::Text(s) => f.write_str(s),
        }
    }
}

/// One priced instrument: a gold type, a currency, or a cryptocurrency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub symbol: String,
    pub price: RawNumber,
    pub unit: String,
    pub change_percent: RawNumber,
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Item {
    pub fn price_value(&self) -> Option<f64> {
        self.price.as_f64()
    }

    pub fn change_value(&self) -> Option<f64> {
        self.change_percent.as_f64()
    }
}

/// The full document one API call returns. Replaced wholesale on every
/// refresh; partial updates are never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default)]
    pub gold: Vec<Item>,
    #[serde(default)]
    pub currency: Vec<Item>,
    #[serde(default)]
    pub cryptocurrency: Vec<Item>,
}

impl MarketSnapshot {
    /// Date/time stamp of the first gold item, which is what the footer
    /// reports as the last-update time.
    pub fn last_updated(&self) -> Option<(&str, &str)> {
        self.gold
            .first()
            .map(|item| (item.date.as_str(), item.time.as_str()))
    }
}

/// The four options of the category selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    All,
    Gold,
    Currency,
    Crypto,
}

impl Default for Category {
    fn default() -> Self {
        Category::All
    }
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::All,
        Category::Gold,
        Category::Currency,
        Category::Crypto,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Gold => "Gold",
            Category::Currency => "Currencies",
            Category::Crypto => "Crypto",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn next(self) -> Category {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Category {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_number_normalizes_both_encodings() {
        assert_eq!(RawNumber::Number(950.0).as_f64(), Some(950.0));
        assert_eq!(RawNumber::Text("1200".into()).as_f64(), Some(1200.0));
        assert_eq!(
            RawNumber::Text(" 3,500,000 ".into()).as_f64(),
            Some(3_500_000.0)
        );
        assert_eq!(RawNumber::Text("n/a".into()).as_f64(), None);
    }

    #[test]
    fn item_decodes_with_mixed_price_encodings() {
        let json = r#"{
            "name": "Bitcoin",
            "symbol": "BTC",
            "price": "65432.10",
            "unit": "USD",
            "change_percent": -1.25,
            "date": "1402-01-01",
            "time": "12:30"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.price, RawNumber::Text("65432.10".into()));
        assert_eq!(item.price_value(), Some(65432.10));
        assert_eq!(item.change_value(), Some(-1.25));
        assert!(item.description.is_none());
    }

    #[test]
    fn snapshot_decodes_with_missing_sections() {
        let json = r#"{"gold": [{"name": "Gold Ounce", "symbol": "XAUUSD",
            "price": 2300, "unit": "USD", "change_percent": "0.4",
            "date": "1402-01-01", "time": "09:00"}]}"#;
        let snapshot: MarketSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.gold.len(), 1);
        assert!(snapshot.currency.is_empty());
        assert!(snapshot.cryptocurrency.is_empty());
        assert_eq!(snapshot.last_updated(), Some(("1402-01-01", "09:00")));
    }

    #[test]
    fn category_cycling_wraps() {
        assert_eq!(Category::All.next(), Category::Gold);
        assert_eq!(Category::Crypto.next(), Category::All);
        assert_eq!(Category::All.prev(), Category::Crypto);
    }
}
