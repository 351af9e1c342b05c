use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"^\s*#").expect("valid comment pattern");
    static ref SYMBOL_HEADER: Regex =
        Regex::new(r"^\s*(\d+\.\d+)%").expect("valid symbol header pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineKind {
    Comment,
    SymbolHeader { percentage: f64 },
    Detail,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        if COMMENT.is_match(line) {
            return LineKind::Comment;
        }

        SYMBOL_HEADER
            .captures(line)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .map(|percentage| LineKind::SymbolHeader { percentage })
            .unwrap_or(LineKind::Detail)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    #[serde(flatten)]
    pub kind: LineKind,
    pub text: String,
}

impl ReportLine {
    fn new(kind: LineKind, text: &str) -> Self {
        ReportLine {
            kind,
            text: text.to_string(),
        }
    }
}

/// A symbol with its share of samples and the call-chain lines printed
/// under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    /// 1-based, in report order.
    pub index: usize,
    pub header: ReportLine,
    pub details: Vec<ReportLine>,
}

impl Hotspot {
    pub fn percentage(&self) -> f64 {
        match self.header.kind {
            LineKind::SymbolHeader { percentage } => percentage,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportNode {
    /// Comments, and detail lines that do not follow a symbol header.
    Line(ReportLine),
    Hotspot(Hotspot),
}

impl ReportNode {
    fn split_first(&self) -> (&ReportLine, &[ReportLine]) {
        match self {
            ReportNode::Line(line) => (line, &[][..]),
            ReportNode::Hotspot(hotspot) => (&hotspot.header, hotspot.details.as_slice()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub nodes: Vec<ReportNode>,
}

impl Report {
    pub fn hotspots(&self) -> impl Iterator<Item = &Hotspot> {
        self.nodes.iter().filter_map(|node| match node {
            ReportNode::Hotspot(hotspot) => Some(hotspot),
            ReportNode::Line(_) => None,
        })
    }

    pub fn hotspot(&self, index: usize) -> Option<&Hotspot> {
        self.hotspots().find(|hotspot| hotspot.index == index)
    }

    /// Every input line in its original order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .flat_map(|node| {
                let (first, rest) = node.split_first();
                std::iter::once(first).chain(rest)
            })
            .map(|line| line.text.as_str())
    }
}

enum State {
    ReadingHeader,
    ReadingDetail(Hotspot),
}

/// Groups a `perf report` listing into hotspots.
///
/// Never fails; text without symbol headers yields a report without
/// hotspots.
pub fn parse_report(text: &str) -> Report {
    let mut nodes = vec![];
    let mut last_index = 0;
    let mut state = State::ReadingHeader;

    for line in text.lines() {
        let kind = LineKind::classify(line);

        state = match state {
            State::ReadingDetail(mut hotspot) if kind == LineKind::Detail => {
                hotspot.details.push(ReportLine::new(kind, line));
                State::ReadingDetail(hotspot)
            }
            State::ReadingDetail(hotspot) => {
                nodes.push(ReportNode::Hotspot(hotspot));
                read_header(&mut nodes, &mut last_index, kind, line)
            }
            State::ReadingHeader => read_header(&mut nodes, &mut last_index, kind, line),
        };
    }

    if let State::ReadingDetail(hotspot) = state {
        nodes.push(ReportNode::Hotspot(hotspot));
    }

    log::debug!("parsed {last_index} hotspots from report");

    Report { nodes }
}

fn read_header(
    nodes: &mut Vec<ReportNode>,
    last_index: &mut usize,
    kind: LineKind,
    line: &str,
) -> State {
    match kind {
        LineKind::SymbolHeader { .. } => {
            *last_index += 1;
            State::ReadingDetail(Hotspot {
                index: *last_index,
                header: ReportLine::new(kind, line),
                details: vec![],
            })
        }
        _ => {
            nodes.push(ReportNode::Line(ReportLine::new(kind, line)));
            State::ReadingHeader
        }
    }
}
