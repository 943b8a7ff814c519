use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{JavelinError, Result};
use crate::vcsurl::RepositoryIdentity;

/// The one JSON document the analyzer prints: a symbol array and a
/// reference array, in discovery order.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawGraph {
    pub symbols: Vec<RawSymbol>,
    pub refs: Vec<RawRef>,
}

/// A symbol as the analyzer emits it: Java separators in the path, Java
/// kind tags, file path relative to the unit directory.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSymbol {
    pub path: String,
    pub kind: String,
    pub name: String,
    pub file: String,
    pub ident_start: usize,
    pub ident_end: usize,
    pub def_start: usize,
    pub def_end: usize,
    pub modifiers: Vec<String>,
    pub pkg: String,
    pub doc: String,
    pub type_expr: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRef {
    pub symbol_origin: String,
    pub symbol_path: String,
    pub file: String,
    pub start: usize,
    pub end: usize,
}

/// Identity of a symbol in the output: the unit that declares it plus its
/// canonical path within that unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SymbolKey {
    pub unit: String,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Package,
    Type,
    Func,
    Var,
}

/// Kind-specific payload carried next to the generic kind tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KindData {
    Package { path: String },
    Type { definition: String },
    Func { signature: String },
    Var { type_expr: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    pub key: SymbolKey,
    pub kind: SymbolKind,
    pub name: String,
    pub file: PathBuf,
    pub ident_start: usize,
    pub ident_end: usize,
    pub def_start: usize,
    pub def_end: usize,
    pub pkg: String,
    pub exported: bool,
    pub data: KindData,
}

/// Javadoc attached to a symbol, emitted as its own record.
#[derive(Debug, Clone, Serialize)]
pub struct Doc {
    pub key: SymbolKey,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Ident,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    pub symbol_path: String,
    pub kind: RefKind,
    pub file: PathBuf,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defining_repo: Option<RepositoryIdentity>,
}

/// Converts a Java qualified name to the canonical path form: `.` becomes
/// the package separator `/`, then compiler `$` nesting becomes `.`. The
/// order matters, and a `:` delimiter passes through untouched.
pub fn convert_symbol_path(path: &str) -> String {
    path.replace('.', "/").replace('$', ".")
}

impl RawSymbol {
    /// Maps the raw record into the canonical model, or rejects it when
    /// the kind tag is not one we know.
    pub fn normalize(&self, unit: &str) -> Result<Symbol> {
        let (kind, data) = match self.kind.as_str() {
            "PACKAGE" => (SymbolKind::Package, KindData::Package { path: self.pkg.clone() }),
            "ENUM" | "CLASS" | "INTERFACE" | "ANNOTATION_TYPE" => {
                (SymbolKind::Type, KindData::Type { definition: self.type_expr.clone() })
            }
            "METHOD" | "CONSTRUCTOR" => (SymbolKind::Func, KindData::Func { signature: self.type_expr.clone() }),
            "PARAMETER" | "EXCEPTION_PARAMETER" | "RESOURCE_VARIABLE" | "LOCAL_VARIABLE" | "FIELD"
            | "ENUM_CONSTANT" => (SymbolKind::Var, KindData::Var { type_expr: self.type_expr.clone() }),
            other => return Err(JavelinError::UnknownSymbolKind(other.to_owned())),
        };

        Ok(Symbol {
            key: SymbolKey { unit: unit.to_owned(), path: convert_symbol_path(&self.path) },
            kind,
            name: self.name.clone(),
            file: PathBuf::from(&self.file),
            ident_start: self.ident_start,
            ident_end: self.ident_end,
            def_start: self.def_start,
            def_end: self.def_end,
            pkg: convert_symbol_path(&self.pkg),
            exported: self.modifiers.iter().any(|modifier| modifier == "public"),
            data,
        })
    }
}

impl RawRef {
    /// Maps the raw reference into the canonical model. Everything the
    /// analyzer emits is an identifier use; repository attribution happens
    /// in a later pass.
    pub fn normalize(&self) -> Reference {
        Reference {
            symbol_path: convert_symbol_path(&self.symbol_path),
            kind: RefKind::Ident,
            file: PathBuf::from(&self.file),
            start: self.start,
            end: self.end,
            defining_repo: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_symbol(kind: &str) -> RawSymbol {
        RawSymbol {
            path: "com.example.Outer$Inner".to_owned(),
            kind: kind.to_owned(),
            name: "Inner".to_owned(),
            file: "src/main/java/com/example/Outer.java".to_owned(),
            ident_start: 120,
            ident_end: 125,
            def_start: 100,
            def_end: 400,
            modifiers: vec!["public".to_owned(), "static".to_owned()],
            pkg: "com.example".to_owned(),
            doc: String::new(),
            type_expr: "Outer.Inner".to_owned(),
        }
    }

    #[test]
    fn converts_qualified_names() {
        let cases = [
            ("foo.bar", "foo/bar"),
            ("foo", "foo"),
            ("foo.bar:baz.qux", "foo/bar:baz/qux"),
            ("foo.bar:foo$baz.qux", "foo/bar:foo.baz/qux"),
        ];

        for (input, expected) in cases {
            assert_eq!(convert_symbol_path(input), expected, "converting {:?}", input);
        }
    }

    #[test]
    fn normalizes_a_type_symbol() {
        let symbol = raw_symbol("CLASS").normalize("myunit").unwrap();

        assert_eq!(symbol.key.unit, "myunit");
        assert_eq!(symbol.key.path, "com/example/Outer.Inner");
        assert_eq!(symbol.kind, SymbolKind::Type);
        assert_eq!(symbol.data, KindData::Type { definition: "Outer.Inner".to_owned() });
        assert_eq!(symbol.pkg, "com/example");
        assert_eq!(symbol.file, PathBuf::from("src/main/java/com/example/Outer.java"));
        assert!(symbol.exported);
    }

    #[test]
    fn kind_tags_map_onto_the_taxonomy() {
        let cases = [
            ("PACKAGE", SymbolKind::Package),
            ("ENUM", SymbolKind::Type),
            ("CLASS", SymbolKind::Type),
            ("INTERFACE", SymbolKind::Type),
            ("ANNOTATION_TYPE", SymbolKind::Type),
            ("METHOD", SymbolKind::Func),
            ("CONSTRUCTOR", SymbolKind::Func),
            ("PARAMETER", SymbolKind::Var),
            ("EXCEPTION_PARAMETER", SymbolKind::Var),
            ("RESOURCE_VARIABLE", SymbolKind::Var),
            ("LOCAL_VARIABLE", SymbolKind::Var),
            ("FIELD", SymbolKind::Var),
            ("ENUM_CONSTANT", SymbolKind::Var),
        ];

        for (tag, expected) in cases {
            assert_eq!(raw_symbol(tag).normalize("u").unwrap().kind, expected, "mapping {:?}", tag);
        }
    }

    #[test]
    fn method_signature_comes_from_the_type_expr() {
        let mut raw = raw_symbol("METHOD");
        raw.type_expr = "(int, String) -> void".to_owned();

        let symbol = raw.normalize("u").unwrap();

        assert_eq!(symbol.data, KindData::Func { signature: "(int, String) -> void".to_owned() });
    }

    #[test]
    fn package_data_keeps_the_java_form() {
        let symbol = raw_symbol("PACKAGE").normalize("u").unwrap();

        assert_eq!(symbol.data, KindData::Package { path: "com.example".to_owned() });
        assert_eq!(symbol.pkg, "com/example");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = raw_symbol("MODULE").normalize("u");

        assert!(matches!(result, Err(JavelinError::UnknownSymbolKind(tag)) if tag == "MODULE"));
    }

    #[test]
    fn exported_requires_the_public_modifier() {
        let mut raw = raw_symbol("FIELD");

        raw.modifiers = vec!["private".to_owned(), "final".to_owned()];
        assert!(!raw.normalize("u").unwrap().exported);

        raw.modifiers = Vec::new();
        assert!(!raw.normalize("u").unwrap().exported);

        raw.modifiers = vec!["public".to_owned()];
        assert!(raw.normalize("u").unwrap().exported);
    }

    #[test]
    fn reference_normalization() {
        let raw = RawRef {
            symbol_origin: "jar:file:/x/a.jar!/A.class".to_owned(),
            symbol_path: "com.example.A:go$deep".to_owned(),
            file: "src/main/java/Use.java".to_owned(),
            start: 10,
            end: 15,
        };

        let reference = raw.normalize();

        assert_eq!(reference.symbol_path, "com/example/A:go.deep");
        assert_eq!(reference.kind, RefKind::Ident);
        assert_eq!(reference.file, PathBuf::from("src/main/java/Use.java"));
        assert_eq!(reference.defining_repo, None);
    }

    #[test]
    fn decodes_analyzer_json() {
        let raw: RawGraph = serde_json::from_str(
            r#"{
                "symbols": [
                    {
                        "path": "com.example.App",
                        "kind": "CLASS",
                        "name": "App",
                        "file": "src/main/java/App.java",
                        "identStart": 7,
                        "identEnd": 10,
                        "defStart": 0,
                        "defEnd": 120,
                        "modifiers": ["public"],
                        "pkg": "com.example",
                        "typeExpr": "App",
                        "futureField": true
                    }
                ],
                "refs": [
                    {
                        "symbolOrigin": "",
                        "symbolPath": "com.example.App",
                        "file": "src/main/java/App.java",
                        "start": 7,
                        "end": 10
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(raw.symbols.len(), 1);
        assert_eq!(raw.symbols[0].ident_start, 7);
        assert_eq!(raw.symbols[0].doc, "");
        assert_eq!(raw.refs[0].symbol_path, "com.example.App");
    }
}
