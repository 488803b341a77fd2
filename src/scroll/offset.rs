use std::fmt;
use std::str::FromStr;

/// A point along an element or the viewport, measured from its leading edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    Start,
    Center,
    End,
    /// Fraction of the length, `0.0` = start, `1.0` = end.
    Fraction(f32),
    Pixels(f32),
}

impl Edge {
    pub fn resolve(self, length: f32) -> f32 {
        match self {
            Edge::Start => 0.0,
            Edge::Center => length * 0.5,
            Edge::End => length,
            Edge::Fraction(f) => length * f,
            Edge::Pixels(px) => px,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseOffsetError {
    #[error("unrecognised edge {0:?}")]
    Edge(String),

    #[error("intersection {0:?} must name a target edge and a container edge")]
    Intersection(String),
}

impl FromStr for Edge {
    type Err = ParseOffsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseOffsetError::Edge(s.to_string());
        match s.trim() {
            "start" => Ok(Edge::Start),
            "center" => Ok(Edge::Center),
            "end" => Ok(Edge::End),
            other => {
                if let Some(px) = other.strip_suffix("px") {
                    px.parse().map(Edge::Pixels).map_err(|_| err())
                } else if let Some(pct) = other.strip_suffix('%') {
                    pct.parse::<f32>()
                        .map(|p| Edge::Fraction(p / 100.0))
                        .map_err(|_| err())
                } else {
                    other.parse().map(Edge::Fraction).map_err(|_| err())
                }
            }
        }
    }
}

/// "When the target's `target` edge meets the container's `container` edge."
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub target: Edge,
    pub container: Edge,
}

impl Intersection {
    pub const fn new(target: Edge, container: Edge) -> Self {
        Self { target, container }
    }
}

impl FromStr for Intersection {
    type Err = ParseOffsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(target), Some(container), None) => Ok(Self {
                target: target.parse()?,
                container: container.parse()?,
            }),
            _ => Err(ParseOffsetError::Intersection(s.to_string())),
        }
    }
}

/// The pair of intersections at which scroll progress reads 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOffset {
    pub from: Intersection,
    pub to: Intersection,
}

impl ScrollOffset {
    /// From the element's top entering the bottom of the viewport until its
    /// bottom leaves through the top.
    pub const ENTER_EXIT: Self = Self {
        from: Intersection::new(Edge::Start, Edge::End),
        to: Intersection::new(Edge::End, Edge::Start),
    };

    /// While the element is pinned: its top at the viewport top until its
    /// bottom reaches the viewport bottom.
    pub const CONTAINED: Self = Self {
        from: Intersection::new(Edge::Start, Edge::Start),
        to: Intersection::new(Edge::End, Edge::End),
    };

    /// From the element's top at the viewport top until its bottom passes
    /// the viewport top.
    pub const SCROLL_PAST: Self = Self {
        from: Intersection::new(Edge::Start, Edge::Start),
        to: Intersection::new(Edge::End, Edge::Start),
    };

    pub fn parse(from: &str, to: &str) -> Result<Self, ParseOffsetError> {
        Ok(Self {
            from: from.parse()?,
            to: to.parse()?,
        })
    }
}

impl Default for ScrollOffset {
    fn default() -> Self {
        Self::SCROLL_PAST
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Start => f.write_str("start"),
            Edge::Center => f.write_str("center"),
            Edge::End => f.write_str("end"),
            Edge::Fraction(v) => write!(f, "{v}"),
            Edge::Pixels(px) => write!(f, "{px}px"),
        }
    }
}
