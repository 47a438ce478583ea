//! One searchable dropdown shared by every wizard choice field.

/// Object-safe view of a [`SearchableSelect`] used by input handling and
/// rendering, which do not know the option type.
pub trait ChoiceList {
    fn query(&self) -> &str;
    fn selected_label(&self) -> Option<String>;
    fn match_labels(&self) -> Vec<String>;
    fn push_char(&mut self, ch: char);
    fn pop_char(&mut self);
    fn cycle(&mut self, forward: bool);
    fn clear_selection(&mut self);
}

#[derive(Clone)]
pub struct SearchableSelect<T> {
    options: Vec<T>,
    label: fn(&T) -> String,
    query: String,
    selected: Option<usize>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for SearchableSelect<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchableSelect")
            .field("options", &self.options)
            .field("query", &self.query)
            .field("selected", &self.selected)
            .finish()
    }
}

impl<T> SearchableSelect<T> {
    pub fn new(options: Vec<T>, label: fn(&T) -> String) -> Self {
        Self {
            options,
            label,
            query: String::new(),
            selected: None,
        }
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.and_then(|index| self.options.get(index))
    }

    /// Selects the first option matching `predicate`. Returns whether one matched.
    pub fn select_where(&mut self, predicate: impl Fn(&T) -> bool) -> bool {
        match self.options.iter().position(predicate) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Option indices whose label contains the query, case-insensitively.
    pub fn matches(&self) -> Vec<usize> {
        let needle = self.query.trim().to_ascii_lowercase();
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| {
                needle.is_empty() || (self.label)(option).to_ascii_lowercase().contains(&needle)
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn follow_query(&mut self) {
        let matches = self.matches();
        if self.selected.is_some_and(|index| matches.contains(&index)) {
            return;
        }
        self.selected = matches.first().copied();
    }
}

impl<T: PartialEq> SearchableSelect<T> {
    /// Swaps the option list, keeping the selection when it is still offered.
    pub fn set_options(&mut self, options: Vec<T>) {
        let previous = self.selected.and_then(|index| self.options.get(index));
        let kept = previous.and_then(|value| options.iter().position(|option| option == value));
        self.options = options;
        self.selected = kept;
    }
}

impl<T> ChoiceList for SearchableSelect<T> {
    fn query(&self) -> &str {
        &self.query
    }

    fn selected_label(&self) -> Option<String> {
        self.selected().map(|option| (self.label)(option))
    }

    fn match_labels(&self) -> Vec<String> {
        self.matches()
            .into_iter()
            .map(|index| (self.label)(&self.options[index]))
            .collect()
    }

    fn push_char(&mut self, ch: char) {
        self.query.push(ch);
        self.follow_query();
    }

    fn pop_char(&mut self) {
        self.query.pop();
        if !self.query.is_empty() {
            self.follow_query();
        }
    }

    fn cycle(&mut self, forward: bool) {
        let matches = self.matches();
        if matches.is_empty() {
            return;
        }
        let position = self
            .selected
            .and_then(|index| matches.iter().position(|candidate| *candidate == index));
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => matches.len() - 1,
            (Some(at), true) => (at + 1) % matches.len(),
            (Some(at), false) => (at + matches.len() - 1) % matches.len(),
        };
        self.selected = Some(matches[next]);
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.query.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit() -> SearchableSelect<&'static str> {
        SearchableSelect::new(vec!["apple", "banana", "cherry"], |value| value.to_string())
    }

    #[test]
    fn typing_filters_and_selects_first_match() {
        let mut select = fruit();
        assert!(select.selected().is_none());
        select.push_char('A');
        select.push_char('n');
        assert_eq!(select.selected(), Some(&"banana"));
        assert_eq!(select.match_labels(), vec!["banana".to_string()]);
        select.push_char('z');
        assert!(select.selected().is_none());
        select.pop_char();
        assert_eq!(select.selected(), Some(&"banana"));
    }

    #[test]
    fn cycle_wraps_within_matches() {
        let mut select = fruit();
        select.cycle(false);
        assert_eq!(select.selected(), Some(&"cherry"));
        select.cycle(true);
        assert_eq!(select.selected(), Some(&"apple"));
    }

    #[test]
    fn set_options_keeps_selection_when_still_offered() {
        let mut select = fruit();
        select.select_where(|value| *value == "cherry");
        select.set_options(vec!["cherry", "date"]);
        assert_eq!(select.selected(), Some(&"cherry"));
        select.set_options(vec!["date"]);
        assert!(select.selected().is_none());
    }
}
