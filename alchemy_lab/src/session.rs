//! Lab session state
//!
//! The two selection slots, the combine/reset/random actions and the running
//! statistics for the current process.

use std::collections::HashSet;

use rand::Rng;

use crate::elements::Element;
use crate::resolver::{ReactionResolver, ResolvedOutcome};

/// Two-slot element selection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Selection {
    slots: [Option<&'static Element>; 2],
}

impl Selection {
    pub fn first(&self) -> Option<&'static Element> {
        self.slots[0]
    }

    pub fn second(&self) -> Option<&'static Element> {
        self.slots[1]
    }

    pub fn pair(&self) -> Option<(&'static Element, &'static Element)> {
        Some((self.slots[0]?, self.slots[1]?))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Fill the first free slot. A full selection, or picking the element that
    /// already sits in the first slot, replaces the first slot.
    pub fn select(&mut self, element: &'static Element) {
        self.slots = match self.slots {
            [None, second] => [Some(element), second],
            [Some(first), None] if first.symbol != element.symbol => [Some(first), Some(element)],
            [_, second] => [Some(element), second],
        };
    }

    pub fn clear(&mut self) {
        self.slots = [None, None];
    }
}

/// Running totals for the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabStats {
    pub experiments: u32,
    pub discovered: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent
    pub discovery_percent: u32,
}

impl LabStats {
    pub fn is_master(&self) -> bool {
        self.total > 0 && self.discovered >= self.total
    }
}

pub struct LabSession {
    resolver: ReactionResolver,
    selection: Selection,
    last_outcome: Option<ResolvedOutcome>,
    experiments: u32,
    discovered: HashSet<String>,
}

impl Default for LabSession {
    fn default() -> Self {
        Self::new(ReactionResolver::standard())
    }
}

impl LabSession {
    pub fn new(resolver: ReactionResolver) -> Self {
        Self {
            resolver,
            selection: Selection::default(),
            last_outcome: None,
            experiments: 0,
            discovered: HashSet::new(),
        }
    }

    pub fn resolver(&self) -> &ReactionResolver {
        &self.resolver
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn last_outcome(&self) -> Option<&ResolvedOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn select(&mut self, element: &'static Element) {
        self.selection.select(element);
    }

    pub fn can_combine(&self) -> bool {
        self.selection.pair().is_some()
    }

    /// Resolve the selected pair, or `None` when a slot is still empty
    pub fn combine(&mut self) -> Option<&ResolvedOutcome> {
        let (a, b) = self.selection.pair()?;
        let outcome = self.resolver.resolve(a.symbol, b.symbol);

        self.experiments += 1;
        if outcome.is_known() {
            self.discovered.insert(outcome.key().to_string());
        }
        log::info!(
            "Combined {} + {} -> {} ({})",
            a.symbol,
            b.symbol,
            outcome.reaction().product_name,
            outcome.category()
        );

        self.last_outcome = Some(outcome);
        self.last_outcome.as_ref()
    }

    /// Clear both slots and the displayed outcome. Statistics are kept.
    pub fn reset(&mut self) {
        self.selection.clear();
        self.last_outcome = None;
    }

    /// Fill both slots with two distinct random elements
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let elements = self.resolver.elements();
        if elements.len() < 2 {
            return;
        }
        let all = elements.all();
        let first = rng.gen_range(0..all.len());
        let mut second = rng.gen_range(0..all.len() - 1);
        if second >= first {
            second += 1;
        }

        self.selection.clear();
        self.selection.select(&all[first]);
        self.selection.select(&all[second]);
        self.last_outcome = None;
    }

    pub fn is_discovered(&self, key: &str) -> bool {
        self.discovered.contains(key)
    }

    pub fn stats(&self) -> LabStats {
        let total = self.resolver.catalog().len();
        let discovered = self.discovered.len();
        let discovery_percent = if total == 0 {
            0
        } else {
            (discovered as f64 / total as f64 * 100.0).round() as u32
        };

        LabStats {
            experiments: self.experiments,
            discovered,
            total,
            discovery_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementTable;

    fn el(symbol: &str) -> &'static Element {
        ElementTable::standard().get(symbol).unwrap()
    }

    #[test]
    fn test_selection_fills_slots_in_order() {
        let mut selection = Selection::default();
        selection.select(el("H"));
        assert_eq!(selection.first().unwrap().symbol, "H");
        assert!(selection.second().is_none());

        selection.select(el("O"));
        let (a, b) = selection.pair().unwrap();
        assert_eq!((a.symbol, b.symbol), ("H", "O"));
    }

    #[test]
    fn test_selecting_same_element_replaces_first() {
        let mut selection = Selection::default();
        selection.select(el("Fe"));
        selection.select(el("Fe"));
        assert_eq!(selection.first().unwrap().symbol, "Fe");
        assert!(selection.second().is_none());
    }

    #[test]
    fn test_full_selection_replaces_first() {
        let mut selection = Selection::default();
        selection.select(el("H"));
        selection.select(el("O"));
        selection.select(el("Na"));
        let (a, b) = selection.pair().unwrap();
        assert_eq!((a.symbol, b.symbol), ("Na", "O"));
    }

    #[test]
    fn test_combine_needs_two_elements() {
        let mut session = LabSession::default();
        assert!(session.combine().is_none());
        session.select(el("H"));
        assert!(!session.can_combine());
        assert!(session.combine().is_none());
        assert_eq!(session.stats().experiments, 0);
    }

    #[test]
    fn test_combine_counts_and_discovers() {
        let mut session = LabSession::default();
        session.select(el("H"));
        session.select(el("O"));
        assert_eq!(session.combine().unwrap().reaction().product_name, "Water");
        session.combine();

        session.reset();
        session.select(el("He"));
        session.select(el("Ne"));
        assert!(!session.combine().unwrap().is_known());

        let stats = session.stats();
        assert_eq!(stats.experiments, 3);
        assert_eq!(stats.discovered, 1);
        assert!(session.is_discovered("HO"));
        assert_eq!(stats.total, 34);
        assert_eq!(stats.discovery_percent, 3);
        assert!(!stats.is_master());
    }

    #[test]
    fn test_reset_keeps_statistics() {
        let mut session = LabSession::default();
        session.select(el("Na"));
        session.select(el("Cl"));
        session.combine();
        session.reset();
        assert!(session.selection().is_empty());
        assert!(session.last_outcome().is_none());
        assert_eq!(session.stats().experiments, 1);
    }

    #[test]
    fn test_randomize_picks_two_distinct_elements() {
        let mut session = LabSession::default();
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            session.randomize(&mut rng);
            let (a, b) = session.selection().pair().unwrap();
            assert_ne!(a.symbol, b.symbol);
        }
    }

    #[test]
    fn test_discovering_everything_makes_a_master() {
        let mut session = LabSession::default();
        let table = ElementTable::standard();
        let keys: Vec<[&str; 2]> = session.resolver().catalog().iter().map(|e| e.reactants).collect();
        for [a, b] in keys {
            session.reset();
            session.select(table.get(a).unwrap());
            session.selection.slots[1] = table.get(b);
            session.combine();
        }
        let stats = session.stats();
        assert_eq!(stats.discovery_percent, 100);
        assert!(stats.is_master());
    }
}
