//! Package description (`*.cabal`) parser
//!
//! Handles the indentation-based layout of package descriptions:
//! - Top-level fields (`name`, `version`)
//! - `flag` stanzas with `default:` and `manual:`
//! - `common` stanzas and `import:` fields
//! - Components: `library`, `foreign-library`, `executable`, `test-suite`, `benchmark`
//! - `if` / `elif` / `else` blocks inside components and common stanzas
//! - Field values spanning continuation lines, `--` comment lines
//!
//! Unknown fields and sections are ignored.

use super::condition::Condition;
use crate::domain::{Dependency, Version, VersionRange};
use crate::error::{DescriptionError, SourceError};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

// Regex for a field line: `name: value`
static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)\s*:(.*)$").unwrap());

// Regex for a build-depends entry: `name[:sublib | :{sublib, ...}] [range]`
static DEPENDENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Za-z0-9][A-Za-z0-9-]*)(?::(?:[A-Za-z0-9][A-Za-z0-9-]*|\{\s*[A-Za-z0-9][A-Za-z0-9-]*(?:\s*,\s*[A-Za-z0-9][A-Za-z0-9-]*)*\s*\}))?\s*(.*)$",
    )
    .unwrap()
});

/// A `flag` stanza
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDecl {
    /// Flag name, lowercased
    pub name: String,
    pub default: bool,
    pub manual: bool,
}

/// Kind of a buildable component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Library,
    ForeignLibrary,
    Executable,
    TestSuite,
    Benchmark,
}

impl ComponentKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "library" => Some(ComponentKind::Library),
            "foreign-library" => Some(ComponentKind::ForeignLibrary),
            "executable" => Some(ComponentKind::Executable),
            "test-suite" => Some(ComponentKind::TestSuite),
            "benchmark" => Some(ComponentKind::Benchmark),
            _ => None,
        }
    }

    /// Section keyword for this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            ComponentKind::Library => "library",
            ComponentKind::ForeignLibrary => "foreign-library",
            ComponentKind::Executable => "executable",
            ComponentKind::TestSuite => "test-suite",
            ComponentKind::Benchmark => "benchmark",
        }
    }
}

/// Kind plus name; only the main library has no name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentName {
    pub kind: ComponentKind,
    pub name: Option<String>,
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {}", self.kind.keyword(), name),
            None => write!(f, "{}", self.kind.keyword()),
        }
    }
}

/// Fields of a component or common stanza, with conditional branches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CondTree {
    pub imports: Vec<String>,
    pub build_depends: Vec<Dependency>,
    pub branches: Vec<CondBranch>,
}

/// An `if` block with its optional `else`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondBranch {
    pub condition: Condition,
    pub then_tree: CondTree,
    pub else_tree: Option<CondTree>,
}

/// A `common` stanza
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonStanza {
    pub name: String,
    pub tree: CondTree,
}

/// A buildable component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: ComponentName,
    pub tree: CondTree,
}

/// A package description before flags and platform are fixed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericDescription {
    pub name: String,
    pub version: Option<Version>,
    pub flags: Vec<FlagDecl>,
    pub common: Vec<CommonStanza>,
    pub components: Vec<Component>,
}

impl GenericDescription {
    /// Looks up a flag declaration by (case-insensitive) name
    pub fn flag(&self, name: &str) -> Option<&FlagDecl> {
        let name = name.to_ascii_lowercase();
        self.flags.iter().find(|f| f.name == name)
    }

    /// Looks up a common stanza by name
    pub fn common_stanza(&self, name: &str) -> Option<&CommonStanza> {
        self.common.iter().find(|c| c.name == name)
    }
}

/// Finds the single `*.cabal` file in `dir`
pub fn find_description(dir: &Path) -> Result<PathBuf, SourceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SourceError::read_error(dir, e))?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_description_file(path))
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(SourceError::DescriptionNotFound {
            dir: dir.to_path_buf(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(SourceError::AmbiguousDescription {
            dir: dir.to_path_buf(),
            candidates,
        }),
    }
}

fn is_description_file(path: &Path) -> bool {
    let has_extension = path.extension().is_some_and(|ext| ext == "cabal");
    let has_stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| !s.is_empty() && !s.starts_with('.'));
    has_extension && has_stem
}

/// Reads and parses the package description at `path`
pub fn load_description(path: &Path) -> Result<GenericDescription, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|e| SourceError::read_error(path, e))?;
    let description = parse(&content).map_err(|source| SourceError::InvalidDescription {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "Parsed {}: {} flag(s), {} common stanza(s), {} component(s)",
        path.display(),
        description.flags.len(),
        description.common.len(),
        description.components.len()
    );
    Ok(description)
}

/// Parses the content of a package description
pub fn parse(content: &str) -> Result<GenericDescription, DescriptionError> {
    let lines = layout_lines(content)?;
    let mut pos = 0;
    let nodes = parse_block(&lines, &mut pos, 0)?;
    if let Some(line) = lines.get(pos) {
        return Err(DescriptionError::syntax(line.number, "unexpected indentation"));
    }

    let mut name = None;
    let mut version = None;
    let mut flags = Vec::new();
    let mut common = Vec::new();
    let mut components = Vec::new();

    for node in &nodes {
        match node {
            Node::Field {
                line,
                name: field,
                value,
            } => match field.as_str() {
                "name" => name = Some(value.clone()),
                "version" => {
                    let parsed = value
                        .parse::<Version>()
                        .map_err(|e| DescriptionError::syntax(*line, format!("{}", e)))?;
                    version = Some(parsed);
                }
                _ => {}
            },
            Node::Section {
                line,
                keyword,
                args,
                children,
            } => match keyword.as_str() {
                "flag" => flags.push(parse_flag(*line, args, children)?),
                "common" => common.push(CommonStanza {
                    name: required_name(*line, keyword, args)?,
                    tree: build_tree(children)?,
                }),
                "if" | "elif" | "else" => {
                    return Err(DescriptionError::syntax(
                        *line,
                        format!("'{}' outside of a component", keyword),
                    ));
                }
                _ => {
                    if let Some(kind) = ComponentKind::from_keyword(keyword) {
                        let component_name = match kind {
                            ComponentKind::Library if args.is_empty() => None,
                            _ => Some(required_name(*line, keyword, args)?),
                        };
                        components.push(Component {
                            name: ComponentName {
                                kind,
                                name: component_name,
                            },
                            tree: build_tree(children)?,
                        });
                    }
                }
            },
        }
    }

    let name = name.ok_or_else(|| DescriptionError::syntax(1, "missing required field 'name'"))?;

    Ok(GenericDescription {
        name,
        version,
        flags,
        common,
        components,
    })
}

struct Line<'a> {
    number: usize,
    indent: usize,
    text: &'a str,
}

enum Node {
    Field {
        line: usize,
        name: String,
        value: String,
    },
    Section {
        line: usize,
        keyword: String,
        args: String,
        children: Vec<Node>,
    },
}

fn layout_lines(content: &str) -> Result<Vec<Line<'_>>, DescriptionError> {
    let mut lines = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let number = index + 1;
        let text = raw.trim_end();
        let trimmed = text.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        let indentation = &text[..text.len() - trimmed.len()];
        if indentation.contains('\t') {
            return Err(DescriptionError::syntax(number, "tabs are not allowed in indentation"));
        }
        lines.push(Line {
            number,
            indent: indentation.len(),
            text: trimmed,
        });
    }
    Ok(lines)
}

/// Parses sibling lines at one indentation level (at least `min_indent`)
fn parse_block(
    lines: &[Line<'_>],
    pos: &mut usize,
    min_indent: usize,
) -> Result<Vec<Node>, DescriptionError> {
    let mut nodes = Vec::new();
    let block_indent = match lines.get(*pos) {
        Some(line) if line.indent >= min_indent => line.indent,
        _ => return Ok(nodes),
    };

    while let Some(line) = lines.get(*pos) {
        if line.indent < block_indent {
            break;
        }
        if line.indent > block_indent {
            return Err(DescriptionError::syntax(line.number, "unexpected indentation"));
        }
        *pos += 1;

        if let Some(caps) = FIELD_RE.captures(line.text) {
            let mut value = caps[2].trim().to_string();
            while let Some(next) = lines.get(*pos) {
                if next.indent <= line.indent {
                    break;
                }
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(next.text);
                *pos += 1;
            }
            nodes.push(Node::Field {
                line: line.number,
                name: caps[1].to_ascii_lowercase(),
                value,
            });
        } else {
            let (keyword, args) = line
                .text
                .split_once(char::is_whitespace)
                .unwrap_or((line.text, ""));
            let children = parse_block(lines, pos, line.indent + 1)?;
            nodes.push(Node::Section {
                line: line.number,
                keyword: keyword.to_ascii_lowercase(),
                args: args.trim().to_string(),
                children,
            });
        }
    }

    Ok(nodes)
}

fn required_name(line: usize, keyword: &str, args: &str) -> Result<String, DescriptionError> {
    if args.is_empty() || args.contains(char::is_whitespace) {
        return Err(DescriptionError::syntax(
            line,
            format!("'{}' requires a single name", keyword),
        ));
    }
    Ok(args.to_string())
}

fn parse_flag(line: usize, args: &str, children: &[Node]) -> Result<FlagDecl, DescriptionError> {
    let mut flag = FlagDecl {
        name: required_name(line, "flag", args)?.to_ascii_lowercase(),
        default: true,
        manual: false,
    };
    for child in children {
        if let Node::Field { line, name, value } = child {
            match name.as_str() {
                "default" => flag.default = parse_bool(*line, value)?,
                "manual" => flag.manual = parse_bool(*line, value)?,
                _ => {}
            }
        }
    }
    Ok(flag)
}

fn parse_bool(line: usize, value: &str) -> Result<bool, DescriptionError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DescriptionError::syntax(
            line,
            format!("expected True or False, found '{}'", value),
        )),
    }
}

fn build_tree(nodes: &[Node]) -> Result<CondTree, DescriptionError> {
    let mut tree = CondTree::default();
    let mut i = 0;
    while i < nodes.len() {
        match &nodes[i] {
            Node::Field { line, name, value } => match name.as_str() {
                "build-depends" => tree.build_depends.extend(parse_build_depends(*line, value)?),
                "import" => tree.imports.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from),
                ),
                _ => {}
            },
            Node::Section { keyword, line, .. } => match keyword.as_str() {
                "if" => {
                    tree.branches.push(parse_conditional(nodes, &mut i)?);
                    continue;
                }
                "elif" | "else" => {
                    return Err(DescriptionError::syntax(
                        *line,
                        format!("'{}' without a preceding 'if'", keyword),
                    ));
                }
                _ => {}
            },
        }
        i += 1;
    }
    Ok(tree)
}

/// Parses `nodes[*i]` (an `if` or `elif`) and any `elif`/`else` chain after it
fn parse_conditional(nodes: &[Node], i: &mut usize) -> Result<CondBranch, DescriptionError> {
    let (line, args, children) = match &nodes[*i] {
        Node::Section {
            line,
            args,
            children,
            ..
        } => (*line, args, children),
        Node::Field { line, .. } => {
            return Err(DescriptionError::syntax(*line, "expected a conditional"));
        }
    };
    *i += 1;

    let condition = Condition::parse(args)
        .map_err(|source| DescriptionError::InvalidCondition { line, source })?;
    let then_tree = build_tree(children)?;

    let else_tree = match nodes.get(*i) {
        Some(Node::Section {
            keyword, children, ..
        }) if keyword == "else" => {
            *i += 1;
            Some(build_tree(children)?)
        }
        Some(Node::Section { keyword, .. }) if keyword == "elif" => {
            let nested = parse_conditional(nodes, i)?;
            Some(CondTree {
                branches: vec![nested],
                ..CondTree::default()
            })
        }
        _ => None,
    };

    Ok(CondBranch {
        condition,
        then_tree,
        else_tree,
    })
}

fn parse_build_depends(line: usize, value: &str) -> Result<Vec<Dependency>, DescriptionError> {
    let mut dependencies = Vec::new();
    for entry in split_entries(value)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let caps = DEPENDENCY_RE.captures(entry).ok_or_else(|| {
            DescriptionError::syntax(line, format!("invalid dependency '{}'", entry))
        })?;
        let range_text = caps[2].trim();
        let range = if range_text.is_empty() {
            VersionRange::Any
        } else {
            range_text
                .parse::<VersionRange>()
                .map_err(|source| DescriptionError::InvalidDependency {
                    line,
                    dependency: entry.to_string(),
                    source,
                })?
        };
        dependencies.push(Dependency::new(&caps[1], range));
    }
    Ok(dependencies)
}

/// Splits on commas outside `{...}` sublibrary sets
fn split_entries(value: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (offset, c) in value.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(&value[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    entries.push(&value[start..]);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"cabal-version: 3.0
name:          sample
version:       0.4.1
synopsis:      A sample package
  spanning two lines

-- build flags
flag dev
  description: Development mode
  default:     False
  manual:      True

flag Fast
  default: true

common shared
  build-depends: base >=4.14 && <5
  ghc-options: -Wall

library
  import: shared
  exposed-modules: Sample
  build-depends:
      text ^>=2.0
    , containers >=0.6
  if flag(dev)
    build-depends: pretty-simple
  elif os(windows)
    build-depends: Win32
  else
    build-depends: unix >=2.7

executable sample-cli
  main-is: Main.hs
  build-depends: sample, optparse-applicative

test-suite unit
  type: exitcode-stdio-1.0
  build-depends: hspec ==2.*

source-repository head
  type: git
  location: https://example.invalid/sample
"#;

    #[test]
    fn test_parse_header_fields() {
        let description = parse(SAMPLE).unwrap();
        assert_eq!(description.name, "sample");
        assert_eq!(description.version, Some("0.4.1".parse().unwrap()));
    }

    #[test]
    fn test_parse_flags() {
        let description = parse(SAMPLE).unwrap();
        assert_eq!(
            description.flags,
            vec![
                FlagDecl {
                    name: "dev".to_string(),
                    default: false,
                    manual: true,
                },
                FlagDecl {
                    name: "fast".to_string(),
                    default: true,
                    manual: false,
                },
            ]
        );
        assert!(description.flag("FAST").is_some());
    }

    #[test]
    fn test_parse_components() {
        let description = parse(SAMPLE).unwrap();
        let names: Vec<String> = description
            .components
            .iter()
            .map(|c| c.name.to_string())
            .collect();
        assert_eq!(names, vec!["library", "executable sample-cli", "test-suite unit"]);
    }

    #[test]
    fn test_parse_common_and_import() {
        let description = parse(SAMPLE).unwrap();
        let shared = description.common_stanza("shared").unwrap();
        assert_eq!(shared.tree.build_depends[0].to_string(), "base >=4.14 && <5");

        let library = &description.components[0];
        assert_eq!(library.tree.imports, vec!["shared"]);
    }

    #[test]
    fn test_parse_multiline_build_depends() {
        let description = parse(SAMPLE).unwrap();
        let library = &description.components[0];
        let deps: Vec<String> = library
            .tree
            .build_depends
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(deps, vec!["text ^>=2.0", "containers >=0.6"]);
    }

    #[test]
    fn test_parse_if_elif_else_chain() {
        let description = parse(SAMPLE).unwrap();
        let library = &description.components[0];
        assert_eq!(library.tree.branches.len(), 1);

        let branch = &library.tree.branches[0];
        assert_eq!(branch.condition, Condition::Flag("dev".to_string()));
        assert_eq!(branch.then_tree.build_depends[0].name, "pretty-simple");

        let elif = &branch.else_tree.as_ref().unwrap().branches[0];
        assert_eq!(elif.condition, Condition::Os("windows".to_string()));
        assert_eq!(elif.then_tree.build_depends[0].name, "Win32");
        let otherwise = elif.else_tree.as_ref().unwrap();
        assert_eq!(otherwise.build_depends[0].to_string(), "unix >=2.7");
    }

    #[test]
    fn test_parse_bare_dependencies() {
        let description = parse(SAMPLE).unwrap();
        let exe = &description.components[1];
        assert_eq!(exe.tree.build_depends[0], Dependency::any("sample"));
        assert_eq!(exe.tree.build_depends[1], Dependency::any("optparse-applicative"));
    }

    #[test]
    fn test_parse_sublibrary_dependency_keeps_package_name() {
        let content = "name: x\nlibrary\n  build-depends: foo:internal >=1\n";
        let description = parse(content).unwrap();
        assert_eq!(description.components[0].tree.build_depends[0].name, "foo");
    }

    #[test]
    fn test_parse_sublibrary_set_dependency() {
        let content = "cabal-version: 3.0\nname: x\nlibrary\n  build-depends: foo:{bar, baz} >=1 && <2, base\n";
        let description = parse(content).unwrap();
        let deps: Vec<String> = description.components[0]
            .tree
            .build_depends
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(deps, vec!["foo >=1 && <2", "base"]);
    }

    #[test]
    fn test_split_entries_respects_braces() {
        assert_eq!(
            split_entries("a:{b, c}, d >=1,e"),
            vec!["a:{b, c}", " d >=1", "e"]
        );
    }

    #[test]
    fn test_parse_leading_comma_style() {
        let content = "name: x\nlibrary\n  build-depends:\n    , base\n    , text\n";
        let description = parse(content).unwrap();
        assert_eq!(description.components[0].tree.build_depends.len(), 2);
    }

    #[test]
    fn test_parse_named_sublibrary() {
        let content = "name: x\nlibrary internal\n  build-depends: base\n";
        let description = parse(content).unwrap();
        assert_eq!(description.components[0].name.to_string(), "library internal");
    }

    #[test]
    fn test_parse_missing_name() {
        let err = parse("version: 1.0\n").unwrap_err();
        assert!(err.to_string().contains("missing required field 'name'"));
    }

    #[test]
    fn test_parse_invalid_dependency_range() {
        let content = "name: x\nlibrary\n  build-depends: base >=4 &&\n";
        let err = parse(content).unwrap_err();
        assert!(matches!(
            err,
            DescriptionError::InvalidDependency { line: 3, .. }
        ));
    }

    #[test]
    fn test_parse_invalid_condition() {
        let content = "name: x\nlibrary\n  if flag(dev\n    build-depends: base\n";
        let err = parse(content).unwrap_err();
        assert!(matches!(err, DescriptionError::InvalidCondition { line: 3, .. }));
        assert_eq!(
            err.to_string(),
            "line 3: invalid condition 'flag(dev': expected ')'"
        );
    }

    #[test]
    fn test_parse_else_without_if() {
        let content = "name: x\nlibrary\n  else\n    build-depends: base\n";
        let err = parse(content).unwrap_err();
        assert!(err.to_string().contains("without a preceding 'if'"));
    }

    #[test]
    fn test_parse_executable_requires_name() {
        let err = parse("name: x\nexecutable\n  main-is: Main.hs\n").unwrap_err();
        assert!(err.to_string().contains("requires a single name"));
    }

    #[test]
    fn test_parse_bad_flag_default() {
        let err = parse("name: x\nflag dev\n  default: maybe\n").unwrap_err();
        assert!(err.to_string().contains("expected True or False"));
    }

    #[test]
    fn test_parse_tab_indentation() {
        let err = parse("name: x\nlibrary\n\tbuild-depends: base\n").unwrap_err();
        assert!(err.to_string().contains("tabs"));
    }

    #[test]
    fn test_find_description_single() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pkg.cabal"), "name: pkg\n").unwrap();
        fs::write(dir.path().join("cabal.project"), "packages: .\n").unwrap();

        let found = find_description(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("pkg.cabal"));
    }

    #[test]
    fn test_find_description_none() {
        let dir = TempDir::new().unwrap();
        let err = find_description(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::DescriptionNotFound { .. }));
    }

    #[test]
    fn test_find_description_ambiguous() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.cabal"), "name: a\n").unwrap();
        fs::write(dir.path().join("b.cabal"), "name: b\n").unwrap();

        let err = find_description(dir.path()).unwrap_err();
        match err {
            SourceError::AmbiguousDescription { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_load_description_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.cabal");
        fs::write(&path, "name: bad\nlibrary\n  build-depends: base >=\n").unwrap();

        let err = load_description(&path).unwrap_err();
        assert!(err.to_string().contains("bad.cabal"));
    }
}
