use crate::district::District;
use std::collections::BTreeMap;

/// Inscription offsets for districts whose bitmap inscription is not the
/// first one on its sat. Districts not listed use offset 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InscriptionOffsetOverrides {
    offsets: BTreeMap<u32, u64>,
}

impl InscriptionOffsetOverrides {
    pub fn new(offsets: BTreeMap<u32, u64>) -> Self {
        Self { offsets }
    }

    pub fn get(&self, district: District) -> u64 {
        self.offsets
            .get(&district.number())
            .copied()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl FromIterator<(u32, u64)> for InscriptionOffsetOverrides {
    fn from_iter<I: IntoIterator<Item = (u32, u64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
