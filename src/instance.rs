//! Module for parsing and representing station networks.
//!
//! A network is a set of stations identified by index `0..n` together with an
//! n×n distance matrix. Distances may be asymmetric; a zero off-diagonal entry
//! marks an edge with no heuristic desirability.
//!
//! Instances can be loaded from JSON (`{"name": .., "distances": [[..]]}`) or from a
//! TSP-LIB style text file with a full-matrix `EDGE_WEIGHT_SECTION`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{ColonyError, ColonyResult};

/// Spreadsheet-style label for a station index: A..Z, AA..AZ, BA.. and so on.
pub fn station_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Inverse of [`station_label`]. Case-insensitive; `None` for anything that is not
/// a run of ASCII letters.
pub fn station_index(label: &str) -> Option<usize> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// Labels for the first `n` stations.
pub fn station_labels(n: usize) -> Vec<String> {
    (0..n).map(station_label).collect()
}

/// Immutable n×n distance matrix. Construction validates the shape and entries,
/// so every value reachable through this type is finite and nonnegative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DistanceMatrix {
    rows: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Validate and wrap a row-major matrix.
    pub fn new(rows: Vec<Vec<f64>>) -> ColonyResult<Self> {
        let n = rows.len();
        if n < 2 {
            return Err(ColonyError::invalid(format!(
                "at least 2 stations are required, got {}", n
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(ColonyError::invalid(format!(
                    "row {} has {} entries, expected {}", i, row.len(), n
                )));
            }
            for (j, &d) in row.iter().enumerate() {
                if !d.is_finite() || d < 0.0 {
                    return Err(ColonyError::invalid(format!(
                        "distance from {} to {} must be a finite nonnegative number, got {}",
                        i, j, d
                    )));
                }
            }
        }
        Ok(DistanceMatrix { rows })
    }

    /// Build from the upper triangle, mirroring every pair. `pairs` holds
    /// `(i, j, distance)`; unspecified off-diagonal entries stay 0.
    pub fn symmetric(n: usize, pairs: &[(usize, usize, f64)]) -> ColonyResult<Self> {
        let mut rows = vec![vec![0.0; n]; n];
        for &(i, j, d) in pairs {
            if i >= n || j >= n {
                return Err(ColonyError::invalid(format!(
                    "pair ({}, {}) is out of range for {} stations", i, j, n
                )));
            }
            rows[i][j] = d;
            rows[j][i] = d;
        }
        Self::new(rows)
    }

    /// Number of stations.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    /// Distance for the directed edge `i -> j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    /// Outgoing distances from station `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    /// Sum of consecutive edge distances along `route` (no implicit closing edge).
    pub fn path_length(&self, route: &[usize]) -> f64 {
        route.windows(2).map(|w| self.distance(w[0], w[1])).sum()
    }
}

impl<'de> Deserialize<'de> for DistanceMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<Vec<f64>>::deserialize(deserializer)?;
        DistanceMatrix::new(rows).map_err(serde::de::Error::custom)
    }
}

/// A named station network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyInstance {
    /// Name of the instance
    #[serde(default)]
    pub name: String,
    /// Comment/description
    #[serde(default)]
    pub comment: String,
    /// Validated distance matrix
    pub distances: DistanceMatrix,
}

impl ColonyInstance {
    pub fn new(name: &str, distances: DistanceMatrix) -> Self {
        ColonyInstance {
            name: name.to_string(),
            comment: String::new(),
            distances,
        }
    }

    /// Build from raw rows, validating them.
    pub fn from_rows(name: &str, rows: Vec<Vec<f64>>) -> ColonyResult<Self> {
        Ok(Self::new(name, DistanceMatrix::new(rows)?))
    }

    /// Load an instance; `.json` files are deserialized, anything else is parsed
    /// as TSP-LIB style text.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ColonyResult<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let file = File::open(path)?;
        if is_json {
            let instance: ColonyInstance = serde_json::from_reader(BufReader::new(file))?;
            return Ok(instance);
        }
        Self::from_reader(BufReader::new(file))
    }

    /// Parse the TSP-LIB style text format.
    pub fn from_reader<R: BufRead>(reader: R) -> ColonyResult<Self> {
        let mut name = String::new();
        let mut comment = String::new();
        let mut dimension: Option<usize> = None;
        let mut values: Vec<f64> = Vec::new();
        let mut in_weights = false;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if line.starts_with("NAME:") {
                name = line.replace("NAME:", "").trim().to_string();
                continue;
            }
            if line.starts_with("COMMENT:") {
                comment = line.replace("COMMENT:", "").trim().to_string();
                continue;
            }
            if line.starts_with("DIMENSION:") {
                let parsed = line.replace("DIMENSION:", "").trim().parse::<usize>().map_err(|_| {
                    ColonyError::Parse { line: line_no, message: "invalid dimension".to_string() }
                })?;
                dimension = Some(parsed);
                continue;
            }
            if line.starts_with("TYPE:")
                || line.starts_with("EDGE_WEIGHT_TYPE:")
                || line.starts_with("EDGE_WEIGHT_FORMAT:")
            {
                continue;
            }
            if line.starts_with("EDGE_WEIGHT_SECTION") {
                in_weights = true;
                continue;
            }

            if !in_weights {
                return Err(ColonyError::Parse {
                    line: line_no,
                    message: format!("unexpected line before EDGE_WEIGHT_SECTION: {}", line),
                });
            }

            for token in line.split_whitespace() {
                let value: f64 = token.parse().map_err(|_| ColonyError::Parse {
                    line: line_no,
                    message: format!("invalid distance '{}'", token),
                })?;
                values.push(value);
            }
        }

        let n = match dimension {
            Some(n) => n,
            None => {
                // Infer a square matrix when the header is omitted.
                let side = (values.len() as f64).sqrt().round() as usize;
                if side * side != values.len() {
                    return Err(ColonyError::invalid(format!(
                        "{} distances do not form a square matrix", values.len()
                    )));
                }
                side
            }
        };

        if values.len() != n * n {
            return Err(ColonyError::invalid(format!(
                "expected {} distances for dimension {}, found {}",
                n * n, n, values.len()
            )));
        }

        let rows: Vec<Vec<f64>> = values.chunks(n.max(1)).map(|c| c.to_vec()).collect();
        let distances = DistanceMatrix::new(rows)?;

        Ok(ColonyInstance { name, comment, distances })
    }

    /// Number of stations.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.distances.dimension()
    }

    /// Display labels for every station.
    pub fn labels(&self) -> Vec<String> {
        station_labels(self.dimension())
    }

    /// Resolve a start station given either a label (`"C"`) or a plain index (`"2"`).
    pub fn resolve_station(&self, token: &str) -> ColonyResult<usize> {
        let index = token
            .trim()
            .parse::<usize>()
            .ok()
            .or_else(|| station_index(token))
            .ok_or_else(|| ColonyError::invalid(format!("unknown station '{}'", token)))?;
        if index >= self.dimension() {
            return Err(ColonyError::invalid(format!(
                "station '{}' is out of range for {} stations", token, self.dimension()
            )));
        }
        Ok(index)
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let n = self.dimension();
        let mut off_diagonal: Vec<f64> = Vec::new();
        let mut zero_edges = 0;
        let mut asymmetric_pairs = 0;

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = self.distances.distance(i, j);
                if d > 0.0 {
                    off_diagonal.push(d);
                } else {
                    zero_edges += 1;
                }
                if i < j && (d - self.distances.distance(j, i)).abs() > 1e-12 {
                    asymmetric_pairs += 1;
                }
            }
        }

        let (avg_distance, min_distance, max_distance) = if off_diagonal.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                off_diagonal.iter().sum::<f64>() / off_diagonal.len() as f64,
                off_diagonal.iter().cloned().fold(f64::INFINITY, f64::min),
                off_diagonal.iter().cloned().fold(0.0, f64::max),
            )
        };

        InstanceStatistics {
            name: self.name.clone(),
            dimension: n,
            zero_edges,
            asymmetric_pairs,
            avg_distance,
            min_distance,
            max_distance,
        }
    }
}

/// Statistics about a station network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    /// Directed off-diagonal edges with distance 0
    pub zero_edges: usize,
    /// Unordered pairs whose two directions differ
    pub asymmetric_pairs: usize,
    /// Over positive off-diagonal distances
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Stations: {} ({} .. {})", self.dimension,
            station_label(0), station_label(self.dimension.saturating_sub(1)))?;
        writeln!(f, "  Zero-distance edges: {}", self.zero_edges)?;
        writeln!(f, "  Asymmetric pairs: {}", self.asymmetric_pairs)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_station_labels() {
        assert_eq!(station_label(0), "A");
        assert_eq!(station_label(25), "Z");
        assert_eq!(station_label(26), "AA");
        assert_eq!(station_label(27), "AB");
        assert_eq!(station_label(701), "ZZ");
        assert_eq!(station_label(702), "AAA");

        for i in [0, 3, 25, 26, 51, 52, 701, 702, 18277] {
            assert_eq!(station_index(&station_label(i)), Some(i));
        }
        assert_eq!(station_index("c"), Some(2));
        assert_eq!(station_index("A1"), None);
        assert_eq!(station_index(""), None);
    }

    #[test]
    fn test_rejects_invalid_matrices() {
        assert!(DistanceMatrix::new(vec![vec![0.0]]).is_err());
        assert!(DistanceMatrix::new(vec![vec![0.0, 1.0], vec![1.0]]).is_err());
        assert!(DistanceMatrix::new(vec![vec![0.0, -1.0], vec![1.0, 0.0]]).is_err());
        assert!(DistanceMatrix::new(vec![vec![0.0, f64::NAN], vec![1.0, 0.0]]).is_err());
        assert!(DistanceMatrix::new(vec![vec![0.0, 1.0], vec![2.0, 0.0]]).is_ok());
    }

    #[test]
    fn test_symmetric_builder() {
        let m = DistanceMatrix::symmetric(3, &[(0, 1, 4.0), (1, 2, 5.0)]).unwrap();
        assert_eq!(m.distance(1, 0), 4.0);
        assert_eq!(m.distance(2, 1), 5.0);
        assert_eq!(m.distance(0, 2), 0.0);
        assert!(DistanceMatrix::symmetric(2, &[(0, 2, 1.0)]).is_err());
    }

    #[test]
    fn test_parse_text_instance() {
        let text = "NAME: square\nCOMMENT: four stations\nDIMENSION: 4\nEDGE_WEIGHT_TYPE: EXPLICIT\n\
                    EDGE_WEIGHT_SECTION\n0 1 2 3\n1 0 1 2\n2 1 0\n1\n3 2 1 0\nEOF\n";
        let instance = ColonyInstance::from_reader(Cursor::new(text)).unwrap();

        assert_eq!(instance.name, "square");
        assert_eq!(instance.comment, "four stations");
        assert_eq!(instance.dimension(), 4);
        assert_eq!(instance.distances.distance(2, 3), 1.0);
        assert_eq!(instance.distances.distance(3, 0), 3.0);
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        let text = "DIMENSION: 3\nEDGE_WEIGHT_SECTION\n0 1 2\n1 0 1\n";
        assert!(ColonyInstance::from_reader(Cursor::new(text)).is_err());

        let text = "DIMENSION: 2\nEDGE_WEIGHT_SECTION\n0 x\n1 0\n";
        match ColonyInstance::from_reader(Cursor::new(text)) {
            Err(ColonyError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_bundled_instance() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/four_stations.txt");
        let instance = ColonyInstance::from_file(path).unwrap();
        assert_eq!(instance.name, "four_stations");
        assert_eq!(instance.labels(), vec!["A", "B", "C", "D"]);
        assert_eq!(instance.distances.distance(0, 3), 3.0);
        assert_eq!(instance.statistics().asymmetric_pairs, 0);
        assert!(ColonyInstance::from_file("does/not/exist.txt").is_err());
    }

    #[test]
    fn test_parse_json_instance() {
        let json = r#"{"name": "tri", "distances": [[0, 1, 2], [1, 0, 1], [2, 1, 0]]}"#;
        let instance: ColonyInstance = serde_json::from_str(json).unwrap();
        assert_eq!(instance.dimension(), 3);
        assert_eq!(instance.distances.distance(0, 2), 2.0);

        let bad = r#"{"name": "bad", "distances": [[0, -1], [1, 0]]}"#;
        assert!(serde_json::from_str::<ColonyInstance>(bad).is_err());
    }

    #[test]
    fn test_resolve_station() {
        let instance = ColonyInstance::from_rows("t", vec![vec![0.0; 3]; 3]).unwrap();
        assert_eq!(instance.resolve_station("B").unwrap(), 1);
        assert_eq!(instance.resolve_station("2").unwrap(), 2);
        assert!(instance.resolve_station("D").is_err());
        assert!(instance.resolve_station("?").is_err());
    }

    #[test]
    fn test_statistics() {
        let instance = ColonyInstance::from_rows(
            "stats",
            vec![vec![0.0, 2.0, 0.0], vec![2.0, 0.0, 4.0], vec![1.0, 4.0, 0.0]],
        ).unwrap();
        let stats = instance.statistics();
        assert_eq!(stats.zero_edges, 1);
        assert_eq!(stats.asymmetric_pairs, 1);
        assert!((stats.avg_distance - 13.0 / 5.0).abs() < 1e-12);
        assert_eq!(stats.min_distance, 1.0);
        assert_eq!(stats.max_distance, 4.0);
    }
}
