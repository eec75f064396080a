//! A small CART classifier for finding candidate guardrail rules.
//!
//! Each report is labelled good when its mean band is at least
//! [`GOOD_MEAN`], and a shallow Gini tree is fitted on the criterion
//! columns. The printed rules read like guardrails ("if A2 <= 1.50 then
//! needs review").

use crate::matrix::BandMatrix;
use crate::AnalysisError;

/// Mean band at or above which a report counts as good.
pub const GOOD_MEAN: f64 = 2.5;

/// Columns whose names start with one of these letters are features.
pub const FEATURE_LETTERS: [char; 7] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];

const EPSILON: f64 = 1e-7;

/// Growth limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        class: u8,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted binary classification tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    features: Vec<String>,
    root: Node,
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    child_impurity: f64,
}

fn class_counts(y: &[u8], idx: &[usize]) -> [usize; 2] {
    let mut counts = [0, 0];
    for &i in idx {
        counts[usize::from(y[i] != 0)] += 1;
    }
    counts
}

fn gini(counts: [usize; 2]) -> f64 {
    let n = (counts[0] + counts[1]) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / n;
    let p1 = counts[1] as f64 / n;
    1.0 - p0 * p0 - p1 * p1
}

/// Labels and feature rows derived from a band matrix.
///
/// Returns feature names, rows with absent values as 0, and the good/review
/// label of each row.
pub fn training_set(matrix: &BandMatrix) -> (Vec<String>, Vec<Vec<f64>>, Vec<u8>) {
    let feature_cols = matrix.columns_starting_with(&FEATURE_LETTERS);
    let all_cols: Vec<usize> = (0..matrix.columns().len()).collect();

    let names = feature_cols
        .iter()
        .map(|&c| matrix.columns()[c].clone())
        .collect();

    let mut x = Vec::with_capacity(matrix.models().len());
    let mut y = Vec::with_capacity(matrix.models().len());
    for (r, row) in matrix.rows().iter().enumerate() {
        x.push(feature_cols.iter().map(|&c| row[c].unwrap_or(0.0)).collect());
        let good = matrix
            .row_mean(r, &all_cols)
            .is_some_and(|m| m >= GOOD_MEAN);
        y.push(u8::from(good));
    }
    (names, x, y)
}

impl DecisionTree {
    /// Fit on explicit rows and labels.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[u8],
        features: Vec<String>,
        params: TreeParams,
    ) -> Result<Self, AnalysisError> {
        if x.is_empty() || features.is_empty() || x.len() != y.len() {
            return Err(AnalysisError::EmptyTrainingSet);
        }

        let mut importances = vec![0.0; features.len()];
        let idx: Vec<usize> = (0..x.len()).collect();
        let root = grow(x, y, &idx, 0, params, &mut importances);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        Ok(Self {
            features,
            root,
            importances,
        })
    }

    /// Fit the good/review classifier on a band matrix.
    pub fn fit_matrix(matrix: &BandMatrix, params: TreeParams) -> Result<Self, AnalysisError> {
        let (features, x, y) = training_set(matrix);
        let good = y.iter().filter(|&&l| l == 1).count();
        tracing::info!(
            rows = x.len(),
            features = features.len(),
            good,
            "fitting decision tree"
        );
        Self::fit(&x, &y, features, params)
    }

    /// Predicted class of one feature row.
    pub fn predict(&self, row: &[f64]) -> u8 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Number of split levels below the root.
    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }

    /// Feature names with non-zero importance, most important first.
    pub fn feature_importances(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .features
            .iter()
            .cloned()
            .zip(self.importances.iter().copied())
            .filter(|(_, v)| *v > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// The rules as indented text, one condition per line.
    ///
    /// ```text
    /// |--- A2 <= 1.50
    /// |   |--- class: 0
    /// |--- A2 >  1.50
    /// |   |--- class: 1
    /// ```
    pub fn export_text(&self) -> String {
        let mut out = String::new();
        self.write_node(&self.root, 1, &mut out);
        out
    }

    fn write_node(&self, node: &Node, depth: usize, out: &mut String) {
        let indent = format!("{}|---", "|   ".repeat(depth - 1));
        match node {
            Node::Leaf { class } => {
                out.push_str(&format!("{} class: {}\n", indent, class));
            }
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let name = &self.features[*feature];
                out.push_str(&format!("{} {} <= {:.2}\n", indent, name, threshold));
                self.write_node(left, depth + 1, out);
                out.push_str(&format!("{} {} >  {:.2}\n", indent, name, threshold));
                self.write_node(right, depth + 1, out);
            }
        }
    }
}

fn grow(
    x: &[Vec<f64>],
    y: &[u8],
    idx: &[usize],
    depth: usize,
    params: TreeParams,
    importances: &mut [f64],
) -> Node {
    let counts = class_counts(y, idx);
    let impurity = gini(counts);
    let leaf = Node::Leaf {
        class: u8::from(counts[1] > counts[0]),
    };

    if depth >= params.max_depth || idx.len() < params.min_samples_split || impurity <= EPSILON
    {
        return leaf;
    }

    let Some(best) = best_split(x, y, idx) else {
        return leaf;
    };

    let n = idx.len() as f64;
    importances[best.feature] += n * impurity - n * best.child_impurity;

    Node::Split {
        feature: best.feature,
        threshold: best.threshold,
        left: Box::new(grow(x, y, &best.left, depth + 1, params, importances)),
        right: Box::new(grow(x, y, &best.right, depth + 1, params, importances)),
    }
}

/// Lowest weighted child impurity over all features and midpoints. Ties keep
/// the earliest feature and the lowest threshold.
fn best_split(x: &[Vec<f64>], y: &[u8], idx: &[usize]) -> Option<BestSplit> {
    let n = idx.len();
    let total = class_counts(y, idx);
    let mut best: Option<BestSplit> = None;

    for feature in 0..x[idx[0]].len() {
        let mut sorted = idx.to_vec();
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_counts = [0usize; 2];
        for p in 1..n {
            left_counts[usize::from(y[sorted[p - 1]] != 0)] += 1;

            let lo = x[sorted[p - 1]][feature];
            let hi = x[sorted[p]][feature];
            if hi <= lo + EPSILON {
                continue;
            }

            let right_counts = [total[0] - left_counts[0], total[1] - left_counts[1]];
            let child_impurity = (p as f64 * gini(left_counts)
                + (n - p) as f64 * gini(right_counts))
                / n as f64;

            if best
                .as_ref()
                .map_or(true, |b| child_impurity < b.child_impurity - f64::EPSILON)
            {
                let mut threshold = (lo + hi) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    left: sorted[..p].to_vec(),
                    right: sorted[p..].to_vec(),
                    child_impurity,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(columns: &[&str], rows: Vec<Vec<Option<f64>>>) -> BandMatrix {
        let models = (0..rows.len()).map(|i| format!("m{}", i)).collect();
        BandMatrix::new(models, columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_separable_at_depth_one() {
        let m = matrix(
            &["A1", "B1"],
            vec![
                vec![Some(1.0), Some(2.0)],
                vec![Some(1.0), Some(2.0)],
                vec![Some(4.0), Some(2.0)],
                vec![Some(4.0), Some(2.0)],
            ],
        );
        let tree = DecisionTree::fit_matrix(&m, TreeParams::default()).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(
            tree.export_text(),
            "|--- A1 <= 2.50\n|   |--- class: 0\n|--- A1 >  2.50\n|   |--- class: 1\n"
        );
        assert_eq!(tree.feature_importances(), vec![("A1".to_string(), 1.0)]);
    }

    #[test]
    fn test_pure_root_is_leaf() {
        let m = matrix(&["A1"], vec![vec![Some(4.0)], vec![Some(3.0)]]);
        let tree = DecisionTree::fit_matrix(&m, TreeParams::default()).unwrap();

        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.export_text(), "|--- class: 1\n");
        assert!(tree.feature_importances().is_empty());
    }

    #[test]
    fn test_tie_prefers_first_feature() {
        let x = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        let y = vec![0, 1];
        let tree =
            DecisionTree::fit(&x, &y, vec!["A".into(), "B".into()], TreeParams::default()).unwrap();
        assert_eq!(tree.export_text().lines().next(), Some("|--- A <= 0.50"));
    }

    #[test]
    fn test_xor_needs_two_levels() {
        let x = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let y = vec![0, 1, 1, 0];
        let names = vec!["A".to_string(), "B".to_string()];

        let tree = DecisionTree::fit(&x, &y, names.clone(), TreeParams::default()).unwrap();
        assert_eq!(tree.depth(), 2);
        for (row, label) in x.iter().zip(&y) {
            assert_eq!(tree.predict(row), *label);
        }
        assert_eq!(
            tree.export_text(),
            "|--- A <= 0.50\n\
             |   |--- B <= 0.50\n\
             |   |   |--- class: 0\n\
             |   |--- B >  0.50\n\
             |   |   |--- class: 1\n\
             |--- A >  0.50\n\
             |   |--- B <= 0.50\n\
             |   |   |--- class: 1\n\
             |   |--- B >  0.50\n\
             |   |   |--- class: 0\n"
        );

        let stump = DecisionTree::fit(
            &x,
            &y,
            names,
            TreeParams {
                max_depth: 1,
                min_samples_split: 2,
            },
        )
        .unwrap();
        assert_eq!(stump.depth(), 1);
    }

    #[test]
    fn test_min_samples_split() {
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![0, 1];
        let tree = DecisionTree::fit(
            &x,
            &y,
            vec!["A".into()],
            TreeParams {
                max_depth: 3,
                min_samples_split: 3,
            },
        )
        .unwrap();
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.export_text(), "|--- class: 0\n");
    }

    #[test]
    fn test_training_set_imputes_and_labels() {
        let m = matrix(
            &["A1", "G", "overall"],
            vec![
                vec![Some(3.0), None, Some(3.0)],
                vec![None, Some(1.0), Some(2.0)],
            ],
        );
        let (names, x, y) = training_set(&m);
        assert_eq!(names, vec!["A1", "G"]);
        assert_eq!(x, vec![vec![3.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(y, vec![1, 0]);
    }

    #[test]
    fn test_empty_training_set() {
        let m = matrix(&["score"], vec![vec![Some(1.0)]]);
        assert!(matches!(
            DecisionTree::fit_matrix(&m, TreeParams::default()),
            Err(AnalysisError::EmptyTrainingSet)
        ));
    }
}
