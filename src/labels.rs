use std::collections::BTreeSet;

/// Which points get a text annotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelSelection {
    /// Every row whose identifier is in the set; unknown names are ignored.
    Explicit(BTreeSet<String>),
    /// The `n` rows with the largest |fold-change|.
    TopN(usize),
    /// Same as `TopN(10)`.
    #[default]
    Default,
}

pub const DEFAULT_TOP_N: usize = 10;

impl LabelSelection {
    pub fn explicit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelSelection::Explicit(names.into_iter().map(Into::into).collect())
    }

    /// Indices into `ids`/`fcs` of the rows to annotate.
    ///
    /// Explicit sets come back in row order; top-N comes back in rank order
    /// (largest |fc| first, original row order on ties).
    pub fn select(&self, ids: &[String], fcs: &[f64]) -> Vec<usize> {
        debug_assert_eq!(ids.len(), fcs.len());
        match self {
            LabelSelection::Explicit(names) => {
                let picked: Vec<usize> = ids
                    .iter()
                    .enumerate()
                    .filter(|(_, id)| names.contains(id.as_str()))
                    .map(|(i, _)| i)
                    .collect();
                let found: BTreeSet<&str> = picked.iter().map(|&i| ids[i].as_str()).collect();
                let missing: Vec<&str> = names
                    .iter()
                    .map(String::as_str)
                    .filter(|n| !found.contains(n))
                    .collect();
                if !missing.is_empty() {
                    log::debug!("Label names not present in table: {}", missing.join(", "));
                }
                picked
            }
            LabelSelection::TopN(n) => top_n_by_abs(fcs, *n),
            LabelSelection::Default => top_n_by_abs(fcs, DEFAULT_TOP_N),
        }
    }
}

fn top_n_by_abs(fcs: &[f64], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fcs.len()).collect();
    // sort_by is stable, so equal magnitudes keep row order
    order.sort_by(|&a, &b| fcs[b].abs().total_cmp(&fcs[a].abs()));
    order.truncate(n);
    order
}
