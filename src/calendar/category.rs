use std::collections::BTreeMap;

use super::event::EventRecord;

/// Style class for a category. Unknown categories fall back to `other`.
pub fn class_for(category: &str) -> &'static str {
    match category {
        "Concert" => "concert",
        "Ceremony" => "ceremony",
        "Release" => "release",
        "Football" => "football",
        _ => "other",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

impl CheckState {
    pub fn marker(&self) -> &'static str {
        match self {
            CheckState::Checked => "[x]",
            CheckState::Unchecked => "[ ]",
            CheckState::Indeterminate => "[-]",
        }
    }
}

/// Leaf key inside a category. `None` holds events without a subcategory.
type Leaf = Option<String>;

/// One visible row of the filter panel.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterRow {
    Category { name: String, state: CheckState },
    Subcategory { category: String, name: Leaf, checked: bool },
}

impl FilterRow {
    pub fn label(&self) -> String {
        match self {
            FilterRow::Category { name, .. } => name.clone(),
            FilterRow::Subcategory { name, .. } => {
                name.clone().unwrap_or_else(|| "General".to_string())
            }
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            FilterRow::Category { state, .. } => state.marker(),
            FilterRow::Subcategory { checked: true, .. } => CheckState::Checked.marker(),
            FilterRow::Subcategory { checked: false, .. } => CheckState::Unchecked.marker(),
        }
    }
}

/// Two-level category tree with tri-state parents.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    tree: BTreeMap<String, BTreeMap<Leaf, bool>>,
}

impl CategoryFilter {
    pub fn from_events(events: &[EventRecord]) -> Self {
        let mut filter = Self::default();
        filter.sync(events);
        filter
    }

    /// Register categories and subcategories not seen yet, checked.
    pub fn sync(&mut self, events: &[EventRecord]) {
        for ev in events {
            self.tree
                .entry(ev.category.clone())
                .or_default()
                .entry(ev.subcategory.clone())
                .or_insert(true);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn state(&self, category: &str) -> Option<CheckState> {
        let leaves = self.tree.get(category)?;
        let checked = leaves.values().filter(|c| **c).count();
        Some(if checked == leaves.len() {
            CheckState::Checked
        } else if checked == 0 {
            CheckState::Unchecked
        } else {
            CheckState::Indeterminate
        })
    }

    pub fn toggle_category(&mut self, category: &str) {
        let Some(state) = self.state(category) else {
            return;
        };
        let value = state != CheckState::Checked;
        if let Some(leaves) = self.tree.get_mut(category) {
            for checked in leaves.values_mut() {
                *checked = value;
            }
        }
    }

    pub fn toggle_subcategory(&mut self, category: &str, subcategory: Option<&str>) {
        let key = subcategory.map(str::to_string);
        if let Some(checked) = self.tree.get_mut(category).and_then(|l| l.get_mut(&key)) {
            *checked = !*checked;
        }
    }

    pub fn set_all(&mut self, value: bool) {
        for checked in self.tree.values_mut().flat_map(|l| l.values_mut()) {
            *checked = value;
        }
    }

    /// Unknown categories and subcategories are allowed.
    pub fn allows(&self, event: &EventRecord) -> bool {
        self.tree
            .get(&event.category)
            .and_then(|leaves| leaves.get(&event.subcategory))
            .copied()
            .unwrap_or(true)
    }

    /// Flattened rows; a category with only the general leaf shows no children.
    pub fn rows(&self) -> Vec<FilterRow> {
        let mut rows = Vec::new();
        for (name, leaves) in &self.tree {
            let state = self.state(name).unwrap_or(CheckState::Unchecked);
            rows.push(FilterRow::Category { name: name.clone(), state });
            if leaves.len() == 1 && leaves.contains_key(&None) {
                continue;
            }
            for (leaf, checked) in leaves {
                rows.push(FilterRow::Subcategory {
                    category: name.clone(),
                    name: leaf.clone(),
                    checked: *checked,
                });
            }
        }
        rows
    }

    pub fn toggle_row(&mut self, row: &FilterRow) {
        match row {
            FilterRow::Category { name, .. } => self.toggle_category(name),
            FilterRow::Subcategory { category, name, .. } => {
                self.toggle_subcategory(category, name.as_deref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Vec<EventRecord> {
        let d = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        vec![
            EventRecord::new("A", d, "Football").with_subcategory("NFL"),
            EventRecord::new("B", d, "Football").with_subcategory("College"),
            EventRecord::new("C", d, "Concert"),
        ]
    }

    #[test]
    fn test_class_for_falls_back_to_other() {
        assert_eq!(class_for("Concert"), "concert");
        assert_eq!(class_for("Football"), "football");
        assert_eq!(class_for("Birthday"), "other");
    }

    #[test]
    fn test_parent_state_follows_children() {
        let mut filter = CategoryFilter::from_events(&sample());
        assert_eq!(filter.state("Football"), Some(CheckState::Checked));

        filter.toggle_subcategory("Football", Some("NFL"));
        assert_eq!(filter.state("Football"), Some(CheckState::Indeterminate));

        filter.toggle_subcategory("Football", Some("College"));
        assert_eq!(filter.state("Football"), Some(CheckState::Unchecked));
    }

    #[test]
    fn test_toggle_parent_checks_all_from_indeterminate() {
        let mut filter = CategoryFilter::from_events(&sample());
        filter.toggle_subcategory("Football", Some("NFL"));
        filter.toggle_category("Football");
        assert_eq!(filter.state("Football"), Some(CheckState::Checked));

        filter.toggle_category("Football");
        assert_eq!(filter.state("Football"), Some(CheckState::Unchecked));
    }

    #[test]
    fn test_allows_respects_leaf_and_unknowns() {
        let events = sample();
        let mut filter = CategoryFilter::from_events(&events);
        filter.toggle_subcategory("Football", Some("NFL"));
        assert!(!filter.allows(&events[0]));
        assert!(filter.allows(&events[1]));

        let fresh = EventRecord::new("D", events[0].date, "Release");
        assert!(filter.allows(&fresh));
    }

    #[test]
    fn test_sync_keeps_existing_state() {
        let mut events = sample();
        let mut filter = CategoryFilter::from_events(&events);
        filter.toggle_category("Concert");
        events.push(EventRecord::new("E", events[0].date, "Football").with_subcategory("XFL"));
        filter.sync(&events);
        assert_eq!(filter.state("Concert"), Some(CheckState::Unchecked));
        assert_eq!(filter.state("Football"), Some(CheckState::Checked));
    }

    #[test]
    fn test_rows_hide_lone_general_leaf() {
        let filter = CategoryFilter::from_events(&sample());
        let labels: Vec<String> = filter.rows().iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["Concert", "Football", "College", "NFL"]);
    }

    #[test]
    fn test_set_all() {
        let mut filter = CategoryFilter::from_events(&sample());
        filter.set_all(false);
        assert_eq!(filter.state("Concert"), Some(CheckState::Unchecked));
        assert_eq!(filter.state("Football"), Some(CheckState::Unchecked));
    }
}
