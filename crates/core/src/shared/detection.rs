use serde::Serialize;

/// A reported hit: the window rectangle that cleared the threshold, plus the
/// probability the classifier assigned to the target class there.
///
/// Detections are transient per frame; sinks decide what outlives the scan.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub score: f32,
}

impl Detection {
    /// Inclusive right edge column.
    pub fn right(&self) -> u32 {
        self.x + self.width - 1
    }

    /// Inclusive bottom edge row.
    pub fn bottom(&self) -> u32 {
        self.y + self.height - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_inclusive() {
        let d = Detection {
            x: 24,
            y: 0,
            width: 48,
            height: 48,
            score: 0.75,
        };
        assert_eq!(d.right(), 71);
        assert_eq!(d.bottom(), 47);
    }

    #[test]
    fn test_serializes_to_flat_json() {
        let d = Detection {
            x: 24,
            y: 0,
            width: 48,
            height: 48,
            score: 0.75,
        };
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["x"], 24);
        assert_eq!(value["y"], 0);
        assert_eq!(value["width"], 48);
        assert_eq!(value["height"], 48);
        assert_eq!(value["score"], 0.75);
    }
}
