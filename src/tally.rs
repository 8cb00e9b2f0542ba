use std::fmt;

/// Number of markers of one class.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassCount {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

/// Per-class counts in catalog order, plus the total.
///
/// `Display` renders the results text written next to exported images.
#[derive(Clone, Debug, PartialEq)]
pub struct Tally {
    pub classes: Vec<ClassCount>,
    pub total: usize,
}

impl Tally {
    /// Builds a tally from `(name, count)` pairs. With a total of zero every
    /// percentage is `0.0`.
    pub fn from_counts<'a>(counts: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        let counts: Vec<(&str, usize)> = counts.into_iter().collect();
        let total = counts.iter().map(|(_, n)| n).sum();
        let classes = counts
            .into_iter()
            .map(|(name, count)| ClassCount {
                name: name.to_owned(),
                count,
                percentage: percentage(count, total),
            })
            .collect();
        Self { classes, total }
    }

    pub fn count_of(&self, name: &str) -> Option<usize> {
        self.classes.iter().find(|c| c.name == name).map(|c| c.count)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resultados:")?;
        for class in &self.classes {
            writeln!(
                f,
                "{}: {} ({:.2}%)",
                class.name, class.count, class.percentage
            )?;
        }
        write!(f, "Total: {}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_sum_to_hundred() {
        let tally = Tally::from_counts([("Verde", 3), ("Rojo", 1), ("Azul", 1)]);
        assert_eq!(tally.total, 5);
        for (class, expected) in tally.classes.iter().zip([60.0, 20.0, 20.0]) {
            assert!((class.percentage - expected).abs() < 1e-9);
        }
        assert_eq!(
            tally.to_string(),
            "Resultados:\nVerde: 3 (60.00%)\nRojo: 1 (20.00%)\nAzul: 1 (20.00%)\nTotal: 5"
        );
    }

    #[test]
    fn empty_tally_has_zero_percentages() {
        let tally = Tally::from_counts([("Verde", 0), ("Rojo", 0)]);
        assert_eq!(tally.total, 0);
        assert!(tally.classes.iter().all(|c| c.percentage == 0.0));
        assert_eq!(
            tally.to_string(),
            "Resultados:\nVerde: 0 (0.00%)\nRojo: 0 (0.00%)\nTotal: 0"
        );
    }

    #[test]
    fn rounding_to_two_decimals() {
        let tally = Tally::from_counts([("A", 1), ("B", 2)]);
        assert_eq!(
            tally.to_string(),
            "Resultados:\nA: 1 (33.33%)\nB: 2 (66.67%)\nTotal: 3"
        );
        assert_eq!(tally.count_of("B"), Some(2));
        assert_eq!(tally.count_of("C"), None);
    }
}
