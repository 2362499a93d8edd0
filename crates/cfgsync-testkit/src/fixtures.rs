use cfgsync_match::{CompareResult, CompareResultList, RawItem, RawItemList, RawMatchList};
use serde::{Deserialize, Serialize};

/// Minimal configuration object as pulled from one environment.
///
/// `seed` is an explicit cross-environment hint (e.g. an operator-supplied
/// external id); two items with equal seeds are a seeded match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub seed: Option<String>,
}

impl ConfigItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }
}

impl RawItem for ConfigItem {
    fn raw_id(&self) -> &str {
        &self.id
    }
}

pub type ConfigItemList = RawItemList<ConfigItem>;

pub const SEEDED_WEIGHT: i32 = 100;
pub const NAME_WEIGHT: i32 = 10;

/// Pairs items by equal seed (seeded) or equal name (unseeded).
///
/// A pair with equal seeds is reported once, as seeded, even if names match too.
#[derive(Clone, Copy, Debug, Default)]
pub struct NameComparator;

impl NameComparator {
    pub fn compare_items(
        &self,
        source: &ConfigItemList,
        source_idx: &[usize],
        target: &ConfigItemList,
        target_idx: &[usize],
    ) -> CompareResultList {
        let mut out = CompareResultList::empty();
        for &l in source_idx {
            let Some(left) = source.get(l) else { continue };
            for &r in target_idx {
                let Some(right) = target.get(r) else { continue };
                let seeded = matches!((&left.seed, &right.seed), (Some(a), Some(b)) if a == b);
                if seeded {
                    out.push(CompareResult::new(l, r, SEEDED_WEIGHT, true));
                } else if left.name == right.name {
                    out.push(CompareResult::new(l, r, NAME_WEIGHT, false));
                }
            }
        }
        out
    }
}

impl crate::Comparator<ConfigItemList> for NameComparator {
    fn compare(
        &self,
        source: &ConfigItemList,
        source_idx: &[usize],
        target: &ConfigItemList,
        target_idx: &[usize],
    ) -> CompareResultList {
        self.compare_items(source, source_idx, target, target_idx)
    }
}

/// Build a list from `(id, name, seed)` triples.
pub fn items(rows: &[(&str, &str, Option<&str>)]) -> ConfigItemList {
    RawItemList::new(
        rows.iter()
            .map(|(id, name, seed)| {
                let item = ConfigItem::new(*id, *name);
                match seed {
                    Some(s) => item.with_seed(*s),
                    None => item,
                }
            })
            .collect(),
    )
}

/// Names of the items at `idx`, in index order.
pub fn names_at(list: &ConfigItemList, idx: &[usize]) -> Vec<String> {
    idx.iter()
        .filter_map(|&i| list.values().get(i))
        .map(|item| item.name.clone())
        .collect()
}
