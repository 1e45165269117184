//! Method Registry
//!
//! A method couples a command-script template with the tool that reads it and
//! the parser that understands the tool's output. Built-in methods cover the
//! V3, ABC and ia2b flows; `aigbench.toml` may retarget them or add new ones.

use crate::config::{ConfigError, MethodConfig};
use aigbench_logs::ParserKind;
use std::collections::BTreeMap;
use thiserror::Error;

/// Template syntax errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown slot {{{0}}}, expected one of {{input}}, {{pre}}, {{option}}, {{post}}")]
    UnknownSlot(String),

    #[error("unclosed '{{' at byte {0}")]
    Unclosed(usize),

    #[error("unmatched '}}' at byte {0}")]
    UnmatchedClose(usize),
}

/// Named placeholder in a command script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Full path of the case file
    Input,
    /// Command placed before the check
    Pre,
    /// Extra options of the check command
    Option,
    /// Command placed after the check
    Post,
}

impl Slot {
    fn from_name(name: &str) -> Result<Self, TemplateError> {
        match name {
            "input" => Ok(Slot::Input),
            "pre" => Ok(Slot::Pre),
            "option" => Ok(Slot::Option),
            "post" => Ok(Slot::Post),
            other => Err(TemplateError::UnknownSlot(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Slot(Slot),
}

/// Values substituted into a template
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptArgs<'a> {
    /// `{input}`
    pub input: &'a str,
    /// `{pre}`
    pub pre: &'a str,
    /// `{option}`
    pub option: &'a str,
    /// `{post}`
    pub post: &'a str,
}

impl ScriptArgs<'_> {
    fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Input => self.input,
            Slot::Pre => self.pre,
            Slot::Option => self.option,
            Slot::Post => self.post,
        }
    }
}

/// Parsed command-script template.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTemplate {
    source: String,
    pieces: Vec<Piece>,
}

impl ScriptTemplate {
    /// Parse a template, rejecting unknown slots and stray braces
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.next_if(|&(_, next)| next == '{').is_some() => literal.push('{'),
                '}' if chars.next_if(|&(_, next)| next == '}').is_some() => literal.push('}'),
                '{' => {
                    let rest = &source[pos + 1..];
                    let end = rest.find('}').ok_or(TemplateError::Unclosed(pos))?;
                    let slot = Slot::from_name(&rest[..end])?;
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Slot(slot));
                    let close = pos + 1 + end;
                    while chars.next_if(|&(i, _)| i <= close).is_some() {}
                }
                '}' => return Err(TemplateError::UnmatchedClose(pos)),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    /// Substitute every slot
    pub fn render(&self, args: &ScriptArgs<'_>) -> String {
        let mut script = String::with_capacity(self.source.len() + args.input.len());
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => script.push_str(text),
                Piece::Slot(slot) => script.push_str(args.get(*slot)),
            }
        }
        script
    }

    /// Whether the template references a slot
    pub fn uses(&self, slot: Slot) -> bool {
        self.pieces.contains(&Piece::Slot(slot))
    }
}

/// Immutable description of one method
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// Name given on the command line
    pub name: String,
    /// Command script fed on stdin
    pub template: ScriptTemplate,
    /// Tool to launch
    pub executable: String,
    /// Parser for successful runs
    pub parser: ParserKind,
}

struct Builtin {
    name: &'static str,
    template: &'static str,
    executable: &'static str,
    parser: ParserKind,
}

const V3: &str = "../SoCV/hw5/B03901084_hw5/satv";
const IA2B: &str = "./ia2b";
const IA2B_RUN: &str = "./ia2b_run";
const ABC: &str = "../LSV/hehe/abc/abc_16";

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "V3Pdr",
        template: "read aig {input}\nset report -all -off\nset report -reset\nset report -u -off\n\
                   set safety 0\nverify pdr p1 {option} -m 50000\nusage\nq -f\n",
        executable: V3,
        parser: ParserKind::V3Check,
    },
    Builtin {
        name: "V3Itp",
        template: "read aig {input}\nset report -all -off\nset report -reset\nset report -u -off\n\
                   set safety 0\nverify itp p1 {option} -m 50000\nusage\nq -f\n",
        executable: V3,
        parser: ParserKind::V3Check,
    },
    Builtin {
        name: "Ia2bSimpS",
        template: "read aig {input}\nsimplify network -r\nsimplify network -s\n\
                   simplify network -r\ntest network -and\nquit -f\n",
        executable: IA2B,
        parser: ParserKind::AndCount,
    },
    Builtin {
        name: "Ia2bBal",
        template: "read aig {input}\nprint network -le\nsimplify network -b\n\
                   print network -le\nq -f\n",
        executable: IA2B,
        parser: ParserKind::BalanceLevels,
    },
    Builtin {
        name: "AbcPdr",
        template: "read_aiger {input}\n{pre}\npdr {option}\n{post}\ntime\nquit\n",
        executable: ABC,
        parser: ParserKind::AbcCheck,
    },
    Builtin {
        name: "AbcItp",
        template: "read_aiger {input}\nint {option}\ntime\nquit\n",
        executable: ABC,
        parser: ParserKind::AbcCheck,
    },
    Builtin {
        name: "Ia2bPdrRun",
        template: "read aig {input}\n{pre}\ncheck safety pdr 0 {option} -m 50000\n{post}\ntime\nquit\n",
        executable: IA2B_RUN,
        parser: ParserKind::PdrDetail,
    },
    Builtin {
        name: "Ia2bPdrTest",
        template: "read aig {input}\ncheck safety pdr 0 {option} -m 50000\ntime\nquit\n",
        executable: IA2B,
        parser: ParserKind::PdrDetail,
    },
    Builtin {
        name: "Ia2bPbcRun",
        template: "read aig {input}\ncheck safety pbc 0 {option} -m 50000\ntime\nquit\n",
        executable: IA2B_RUN,
        parser: ParserKind::PbcCheck,
    },
    Builtin {
        name: "Ia2bPbcTest",
        template: "read aig {input}\ncheck safety pbc 0 {option} -m 50000\ntime\nquit\n",
        executable: IA2B,
        parser: ParserKind::PbcCheck,
    },
];

/// Method definitions by name
#[derive(Debug, Clone)]
pub struct Registry {
    methods: BTreeMap<String, MethodDef>,
}

impl Registry {
    /// Registry holding the built-in methods only
    pub fn builtin() -> Result<Self, ConfigError> {
        let mut methods = BTreeMap::new();
        for builtin in BUILTINS {
            let template = parse_template(builtin.name, builtin.template)?;
            methods.insert(
                builtin.name.to_string(),
                MethodDef {
                    name: builtin.name.to_string(),
                    template,
                    executable: builtin.executable.to_string(),
                    parser: builtin.parser,
                },
            );
        }
        Ok(Self { methods })
    }

    /// Built-in methods with `[methods.*]` tables applied on top
    pub fn with_overrides(overrides: &BTreeMap<String, MethodConfig>) -> Result<Self, ConfigError> {
        let mut registry = Self::builtin()?;
        for (name, config) in overrides {
            let def = match registry.methods.remove(name) {
                Some(mut def) => {
                    if let Some(template) = &config.template {
                        def.template = parse_template(name, template)?;
                    }
                    if let Some(executable) = &config.executable {
                        def.executable = executable.clone();
                    }
                    if let Some(parser) = config.parser {
                        def.parser = parser;
                    }
                    def
                }
                None => MethodDef {
                    name: name.clone(),
                    template: parse_template(name, require(name, &config.template, "template")?)?,
                    executable: require(name, &config.executable, "executable")?.clone(),
                    parser: config.parser.ok_or_else(|| ConfigError::IncompleteMethod {
                        name: name.clone(),
                        field: "parser",
                    })?,
                },
            };
            registry.methods.insert(name.clone(), def);
        }
        Ok(registry)
    }

    /// Look up a method; an unknown name is fatal
    pub fn get(&self, name: &str) -> Result<&MethodDef, ConfigError> {
        self.methods
            .get(name)
            .ok_or_else(|| ConfigError::UnknownMethod(name.to_string()))
    }

    /// Sorted method definitions
    pub fn methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.values()
    }
}

fn parse_template(name: &str, source: &str) -> Result<ScriptTemplate, ConfigError> {
    ScriptTemplate::parse(source).map_err(|source| ConfigError::Template {
        name: name.to_string(),
        source,
    })
}

fn require<'a>(
    name: &str,
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a String, ConfigError> {
    value.as_ref().ok_or_else(|| ConfigError::IncompleteMethod {
        name: name.to_string(),
        field,
    })
}
