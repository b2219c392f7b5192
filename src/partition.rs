use std::collections::BTreeSet;

use crate::palettes::{ColorMap, Palette};

/// Split of the host's static colors into what the rotation animates and what
/// it leaves alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPartition {
    /// Static entries whose keys no palette defines. Merged under every frame.
    pub baseline: ColorMap,
    /// Union of every palette's keys.
    pub animated: BTreeSet<String>,
}

pub fn partition(palettes: &[Palette], current_static: &ColorMap) -> KeyPartition {
    let animated: BTreeSet<String> = palettes
        .iter()
        .flat_map(|p| p.colors.keys().cloned())
        .collect();

    let baseline = current_static
        .iter()
        .filter(|(key, _)| !animated.contains(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    KeyPartition { baseline, animated }
}

/// Lay a step mapping over the baseline. The step wins on collisions.
pub fn merge_onto(baseline: &ColorMap, step: &ColorMap) -> ColorMap {
    let mut merged = baseline.clone();
    merged.extend(step.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> ColorMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn palette(name: &str, entries: &[(&str, &str)]) -> Palette {
        Palette {
            name: name.to_string(),
            colors: map(entries),
        }
    }

    #[test]
    fn animated_keys_are_excluded_from_baseline() {
        let palettes = [palette("a", &[("foo.bg", "#000000")])];
        let current = map(&[("foo.bg", "#111"), ("other.fg", "#222")]);

        let split = partition(&palettes, &current);

        assert_eq!(split.baseline, map(&[("other.fg", "#222")]));
        assert_eq!(
            split.animated,
            BTreeSet::from(["foo.bg".to_string()])
        );
    }

    #[test]
    fn animated_keys_are_the_union_across_palettes() {
        let palettes = [
            palette("a", &[("bg", "#000000")]),
            palette("b", &[("fg", "#ffffff"), ("bg", "#101010")]),
        ];
        let split = partition(&palettes, &ColorMap::new());

        assert!(split.baseline.is_empty());
        assert_eq!(split.animated.len(), 2);
    }

    #[test]
    fn step_wins_on_merge() {
        let baseline = map(&[("bg", "#000000"), ("border", "#333333")]);
        let step = map(&[("bg", "#ffffff")]);

        let merged = merge_onto(&baseline, &step);

        assert_eq!(merged, map(&[("bg", "#ffffff"), ("border", "#333333")]));
    }
}
