use chumsky::prelude::*;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::severity::SeverityBucket;

lazy_static! {
    static ref INSTRUCTION_ADDRESS: Regex =
        Regex::new(r"^\s*0x[0-9a-fA-F]+:").expect("valid instruction address pattern");
}

const METHOD_MARKER: &str = "method \"";
const DISASSEMBLY_MARKER: &str = "name \"disassembly";

/// One line of an annotated listing, `12.5%: <statement>` or free text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationLine {
    pub text: String,
    /// `None` for lines without a leading percentage.
    pub percentage: Option<f64>,
}

impl AnnotationLine {
    pub fn parse(line: &str) -> Self {
        AnnotationLine {
            text: line.to_string(),
            percentage: read_percentage(line),
        }
    }
}

fn percentage<'src>() -> impl Parser<'src, &'src str, f64> {
    text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .from_str::<f64>()
        .unwrapped()
        .padded()
        .then_ignore(end())
}

fn read_percentage(line: &str) -> Option<f64> {
    let (prefix, _) = line.split_once('%')?;
    percentage().parse(prefix).into_result().ok()
}

pub fn parse_annotation(text: &str) -> Vec<AnnotationLine> {
    text.lines().map(AnnotationLine::parse).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DisassemblyLine {
    /// Compiler IR printed between instructions.
    Hir(String),
    InstructionAddress(String),
}

impl DisassemblyLine {
    fn classify(line: &str) -> Self {
        if INSTRUCTION_ADDRESS.is_match(line) {
            DisassemblyLine::InstructionAddress(line.to_string())
        } else {
            DisassemblyLine::Hir(line.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDisassembly {
    pub name: String,
    pub lines: Vec<DisassemblyLine>,
}

/// Compiler dump split into per-method instruction streams.
///
/// A method section starts at a `method "<name>"` line and runs up to the
/// next one. Its stream starts after the `name "disassembly...` line; a
/// section without that line has an empty stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Disassembly {
    pub methods: Vec<MethodDisassembly>,
}

impl Disassembly {
    pub fn parse(text: &str) -> Self {
        let mut methods: Vec<MethodDisassembly> = vec![];
        let mut in_stream = false;

        for line in text.lines() {
            if let Some(name) = method_name(line) {
                methods.push(MethodDisassembly {
                    name: name.to_string(),
                    lines: vec![],
                });
                in_stream = false;
                continue;
            }

            let Some(method) = methods.last_mut() else {
                continue;
            };

            if in_stream {
                method.lines.push(DisassemblyLine::classify(line));
            } else if line.contains(DISASSEMBLY_MARKER) {
                in_stream = true;
            }
        }

        Disassembly { methods }
    }

    pub fn method(&self, name: &str) -> Option<&MethodDisassembly> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// The instruction stream of `name`, empty when the method is not in the
    /// dump.
    pub fn stream(&self, name: &str) -> &[DisassemblyLine] {
        match self.method(name) {
            Some(method) => method.lines.as_slice(),
            None => {
                log::warn!("no disassembly recorded for method '{name}'");
                &[]
            }
        }
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|method| method.name.as_str())
    }
}

fn method_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(METHOD_MARKER)?;
    let end = rest.rfind('"')?;
    Some(&rest[..end])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrelatedLine {
    NonInstruction {
        text: String,
    },
    /// IR context emitted ahead of the instruction it belongs to.
    Ir {
        text: String,
    },
    Instruction {
        text: String,
        percentage: f64,
        severity: SeverityBucket,
        /// Matching `0x...:` line, missing when the stream ran out.
        disassembly: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub method: String,
    pub max_percentage: f64,
    pub lines: Vec<CorrelatedLine>,
}

impl Correlation {
    pub fn instructions(&self) -> impl Iterator<Item = &CorrelatedLine> {
        self.lines
            .iter()
            .filter(|line| matches!(line, CorrelatedLine::Instruction { .. }))
    }
}

pub fn max_percentage(annotation: &[AnnotationLine]) -> f64 {
    annotation
        .iter()
        .filter_map(|line| line.percentage)
        .fold(0.0, f64::max)
}

/// Walks the annotated lines and the instruction stream side by side.
///
/// Every annotated line with a percentage consumes the IR lines in front of
/// the next instruction, then the instruction itself. The stream is never
/// rewound, and whatever is left after the last annotated line is dropped.
pub fn correlate(annotation: &[AnnotationLine], stream: &[DisassemblyLine]) -> Vec<CorrelatedLine> {
    let max = max_percentage(annotation);

    if stream.is_empty() {
        return annotation
            .iter()
            .map(|line| CorrelatedLine::NonInstruction {
                text: line.text.clone(),
            })
            .collect();
    }

    let mut lines = Vec::with_capacity(annotation.len());
    let mut cursor = 0;

    for line in annotation {
        let Some(percentage) = line.percentage else {
            lines.push(CorrelatedLine::NonInstruction {
                text: line.text.clone(),
            });
            continue;
        };

        while let Some(DisassemblyLine::Hir(ir)) = stream.get(cursor) {
            lines.push(CorrelatedLine::Ir { text: ir.clone() });
            cursor += 1;
        }

        let disassembly = match stream.get(cursor) {
            Some(DisassemblyLine::InstructionAddress(instruction)) => {
                cursor += 1;
                Some(instruction.clone())
            }
            _ => None,
        };

        lines.push(CorrelatedLine::Instruction {
            text: line.text.clone(),
            percentage,
            severity: SeverityBucket::proportional(percentage, max),
            disassembly,
        });
    }

    if cursor < stream.len() {
        log::debug!(
            "{} disassembly lines left after the last annotated instruction",
            stream.len() - cursor
        );
    }

    lines
}

/// Correlates an annotation dump with the disassembly of `method`.
pub fn annotate(annotation: &str, disassembly: &str, method: &str) -> Correlation {
    let annotation = parse_annotation(annotation);
    let disassembly = Disassembly::parse(disassembly);

    Correlation {
        method: method.to_string(),
        max_percentage: max_percentage(&annotation),
        lines: correlate(&annotation, disassembly.stream(method)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFG: &str = r#"begin_compilation
  name "void Richards.schedule()"
  method "void Richards.schedule()"
end_compilation
begin_cfg
  name "disassembly (after)"
  0 0 i1 ParameterValue
    0x00001000: sub sp, sp, #0x20 (32)
  0 0 v2 Goto
    0x00001004: b #+0x10
  0 0 i3 Add
    0x00001008: add w0, w1, w2
end_cfg
begin_compilation
  method "int Richards.main()"
end_compilation
begin_cfg
  name "disassembly (after)"
  0x00002000: ret
end_cfg
"#;

    #[test]
    fn parses_percentage_prefix() {
        assert_eq!(AnnotationLine::parse("10%: add r0").percentage, Some(10.0));
        assert_eq!(AnnotationLine::parse(" 2.75 %:  ldr").percentage, Some(2.75));
        assert_eq!(AnnotationLine::parse("0%:").percentage, Some(0.0));
        assert_eq!(AnnotationLine::parse("").percentage, None);
        assert_eq!(AnnotationLine::parse("Percent | Source").percentage, None);
        assert_eq!(AnnotationLine::parse("loop 10%: faster").percentage, None);
        assert_eq!(AnnotationLine::parse("1.2.3%: x").percentage, None);
        assert_eq!(AnnotationLine::parse("-5%: x").percentage, None);
    }

    #[test]
    fn max_ignores_lines_without_percentage() {
        let lines = parse_annotation("header\n3%: a\n12.5%: b\nfooter");
        assert_eq!(max_percentage(&lines), 12.5);
        assert_eq!(max_percentage(&parse_annotation("a\nb")), 0.0);
    }

    #[test]
    fn splits_methods() {
        let disassembly = Disassembly::parse(CFG);

        assert_eq!(
            disassembly.method_names().collect::<Vec<_>>(),
            vec!["void Richards.schedule()", "int Richards.main()"]
        );

        let schedule = disassembly.stream("void Richards.schedule()");
        assert_eq!(schedule.len(), 8);
        assert_eq!(
            schedule[0],
            DisassemblyLine::Hir("  0 0 i1 ParameterValue".to_string())
        );
        assert_eq!(
            schedule[1],
            DisassemblyLine::InstructionAddress("    0x00001000: sub sp, sp, #0x20 (32)".to_string())
        );
        assert_eq!(schedule[6], DisassemblyLine::Hir("end_cfg".to_string()));
        assert_eq!(schedule[7], DisassemblyLine::Hir("begin_compilation".to_string()));

        let main = disassembly.stream("int Richards.main()");
        assert_eq!(main.len(), 2);
        assert!(matches!(main[0], DisassemblyLine::InstructionAddress(_)));

        assert!(disassembly.stream("void Missing.method()").is_empty());
    }

    #[test]
    fn method_without_disassembly_has_empty_stream() {
        let disassembly = Disassembly::parse("method \"m\"\n  0x10: add\n");
        assert!(disassembly.method("m").is_some());
        assert!(disassembly.stream("m").is_empty());
    }

    #[test]
    fn correlates_single_instruction() {
        let disassembly = "method \"m\"\nname \"disassembly\"\nphi\n0x10: add\n";
        let correlation = annotate("10%: add r0\n\n", disassembly, "m");

        assert_eq!(correlation.max_percentage, 10.0);
        assert_eq!(
            correlation.lines,
            vec![
                CorrelatedLine::Ir {
                    text: "phi".to_string()
                },
                CorrelatedLine::Instruction {
                    text: "10%: add r0".to_string(),
                    percentage: 10.0,
                    severity: SeverityBucket::HOTTEST,
                    disassembly: Some("0x10: add".to_string()),
                },
                CorrelatedLine::NonInstruction {
                    text: String::new()
                },
            ]
        );
    }

    #[test]
    fn cursor_never_rewinds() {
        let annotation = "Source\n1%: sub\n4%: b\n  // comment\n2%: add\n";
        let correlation = annotate(annotation, CFG, "void Richards.schedule()");

        let kinds = correlation
            .lines
            .iter()
            .map(|line| match line {
                CorrelatedLine::NonInstruction { .. } => "text".to_string(),
                CorrelatedLine::Ir { text } => format!("ir:{}", text.trim()),
                CorrelatedLine::Instruction {
                    severity,
                    disassembly,
                    ..
                } => format!(
                    "insn:{}:{}",
                    severity.level(),
                    disassembly.as_deref().unwrap_or("-").trim()
                ),
            })
            .collect::<Vec<_>>();

        assert_eq!(
            kinds,
            vec![
                "text",
                "ir:0 0 i1 ParameterValue",
                "insn:1:0x00001000: sub sp, sp, #0x20 (32)",
                "ir:0 0 v2 Goto",
                "insn:3:0x00001004: b #+0x10",
                "text",
                "ir:0 0 i3 Add",
                "insn:2:0x00001008: add w0, w1, w2",
            ]
        );
        assert_eq!(correlation.instructions().count(), 3);
    }

    #[test]
    fn exhausted_stream_leaves_instruction_unpaired() {
        let correlation = annotate("5%: a\n5%: b\n", "method \"m\"\nname \"disassembly\"\n0x1: a\n", "m");

        assert_eq!(correlation.lines.len(), 2);
        assert!(matches!(
            &correlation.lines[1],
            CorrelatedLine::Instruction { disassembly: None, severity, .. } if *severity == SeverityBucket::HOTTEST
        ));
    }

    #[test]
    fn missing_method_renders_plain_text() {
        let correlation = annotate("10%: add r0\nplain\n", CFG, "void Unknown.method()");

        assert!(correlation.lines.iter().all(|line| matches!(
            line,
            CorrelatedLine::NonInstruction { .. }
        )));
        assert_eq!(correlation.lines.len(), 2);
    }

    #[test]
    fn zero_percentages_are_cold() {
        let disassembly = "method \"m\"\nname \"disassembly\"\n0x1: a\n0x2: b\n";
        let correlation = annotate("0%: a\n0.0%: b\n", disassembly, "m");

        for line in &correlation.lines {
            match line {
                CorrelatedLine::Instruction { severity, .. } => assert!(severity.is_cold()),
                other => panic!("unexpected line {other:?}"),
            }
        }
    }
}
