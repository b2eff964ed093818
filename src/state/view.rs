use crate::market_data::types::{Category, Item, MarketSnapshot};

/// Transient per-session UI state. Never persisted; rebuilt from user
/// interaction each run.
#[derive(Debug, Default)]
pub struct ViewState {
    pub category: Category,
    pub search: String,
    /// When true, keystrokes go to the search box instead of navigation.
    pub search_active: bool,
    /// Item shown in the detail overlay; at most one at a time.
    pub detail: Option<Item>,
    /// Comparison selection, in toggle order. Membership is keyed by symbol.
    pub compare: Vec<Item>,
    /// Cursor into the currently filtered list.
    pub cursor: usize,
}

impl ViewState {
    /// Toggle semantics: present (by symbol) removes, absent appends to the
    /// end. No maximum size.
    pub fn toggle_compare(&mut self, item: &Item) {
        if let Some(pos) = self.compare.iter().position(|i| i.symbol == item.symbol) {
            self.compare.remove(pos);
        } else {
            self.compare.push(item.clone());
        }
    }

    pub fn is_comparing(&self, symbol: &str) -> bool {
        self.compare.iter().any(|i| i.symbol == symbol)
    }

    /// The chart only appears once two or more items are selected; dropping
    /// below two hides it without clearing the selection.
    pub fn chart_visible(&self) -> bool {
        self.compare.len() >= 2
    }

    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let max = len - 1;
        self.cursor = self
            .cursor
            .min(max)
            .saturating_add_signed(delta)
            .min(max);
    }
}

/// Pure derivation of the visible list. Category picks one section or
/// concatenates all three in order gold, currency, cryptocurrency — that
/// order is the display order. Search is a case-insensitive substring match
/// on `name` only; empty search matches everything.
pub fn filter_items<'a>(
    snapshot: &'a MarketSnapshot,
    category: Category,
    search: &str,
) -> Vec<&'a Item> {
    let sections: Vec<&[Item]> = match category {
        Category::Gold => vec![&snapshot.gold],
        Category::Currency => vec![&snapshot.currency],
        Category::Crypto => vec![&snapshot.cryptocurrency],
        Category::All => vec![&snapshot.gold, &snapshot.currency, &snapshot.cryptocurrency],
    };

    let needle = search.to_lowercase();
    sections
        .into_iter()
        .flatten()
        .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
        .collect()
}

/// One bar per selected item: label = name, value = normalized price.
/// Unparseable prices become zero-height bars so selection order is never
/// disturbed.
pub fn comparison_bars(compare: &[Item]) -> Vec<(String, u64)> {
    compare
        .iter()
        .map(|item| {
            let value = item.price_value().unwrap_or(0.0).max(0.0).round() as u64;
            (item.name.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::types::RawNumber;

    fn item(name: &str, symbol: &str, price: RawNumber) -> Item {
        Item {
            name: name.into(),
            symbol: symbol.into(),
            price,
            unit: "Toman".into(),
            change_percent: RawNumber::Number(0.0),
            date: "1402-01-01".into(),
            time: "12:00".into(),
            description: None,
        }
    }

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            gold: vec![
                item("18k Gold", "IR_GOLD_18K", RawNumber::Text("3,450,000".into())),
                item("Gold Coin", "IR_COIN_EMAMI", RawNumber::Number(40_100_000.0)),
            ],
            currency: vec![item("US Dollar", "USD", RawNumber::Number(58_900.0))],
            cryptocurrency: vec![item("Bitcoin", "BTC", RawNumber::Text("65432.10".into()))],
        }
    }

    #[test]
    fn empty_search_returns_exact_concatenation_in_order() {
        let s = snapshot();
        let all = filter_items(&s, Category::All, "");
        let symbols: Vec<_> = all.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, ["IR_GOLD_18K", "IR_COIN_EMAMI", "USD", "BTC"]);

        let gold = filter_items(&s, Category::Gold, "");
        assert_eq!(gold, s.gold.iter().collect::<Vec<_>>());
        let crypto = filter_items(&s, Category::Crypto, "");
        assert_eq!(crypto, s.cryptocurrency.iter().collect::<Vec<_>>());
    }

    #[test]
    fn search_matches_name_case_insensitively_and_misses_nothing() {
        let s = snapshot();
        let hits = filter_items(&s, Category::All, "GoLd");
        let symbols: Vec<_> = hits.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, ["IR_GOLD_18K", "IR_COIN_EMAMI"]);
        for hit in &hits {
            assert!(hit.name.to_lowercase().contains("gold"));
        }

        // symbol text never matches, only the name does
        assert!(filter_items(&s, Category::All, "USD").is_empty());
    }

    #[test]
    fn toggle_twice_restores_contents_and_order() {
        let s = snapshot();
        let mut view = ViewState::default();
        view.toggle_compare(&s.gold[0]);
        view.toggle_compare(&s.currency[0]);
        let before: Vec<_> = view.compare.iter().map(|i| i.symbol.clone()).collect();

        view.toggle_compare(&s.cryptocurrency[0]);
        view.toggle_compare(&s.cryptocurrency[0]);

        let after: Vec<_> = view.compare.iter().map(|i| i.symbol.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn chart_appears_at_two_selections_and_hides_below() {
        let s = snapshot();
        let mut view = ViewState::default();
        view.toggle_compare(&s.gold[0]);
        assert!(!view.chart_visible());
        view.toggle_compare(&s.currency[0]);
        assert!(view.chart_visible());
        view.toggle_compare(&s.gold[0]);
        assert!(!view.chart_visible());
        assert_eq!(view.compare.len(), 1);
    }

    #[test]
    fn bars_follow_selection_order_and_parse_string_prices() {
        let a = item("Item A", "A", RawNumber::Text("1200".into()));
        let b = item("Item B", "B", RawNumber::Number(950.0));
        let bars = comparison_bars(&[a, b]);
        assert_eq!(bars, vec![("Item A".to_string(), 1200), ("Item B".to_string(), 950)]);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut view = ViewState::default();
        view.move_cursor(1, 3);
        view.move_cursor(1, 3);
        view.move_cursor(1, 3);
        assert_eq!(view.cursor, 2);
        view.move_cursor(-5, 3);
        assert_eq!(view.cursor, 0);
        view.move_cursor(1, 0);
        assert_eq!(view.cursor, 0);
    }
}
