use serde_json::{Value, json};

use super::*;
use crate::ast::TypeDeclaration;
use crate::source::SourceFile;

const FILE: &str = "/work/src/widget.c";

const SOURCE: &str = r#"/* widget.c: widget helpers. */
#include <stddef.h>

/** Maximum widget count. */
#define WIDGET_MAX 16

/** A widget. */
typedef struct widget {
    int width; /**< Width in pixels. */
    struct widget *next;
} widget_t;

/** A point. */
typedef struct {
    int x;
} point_t;

/** Colors. */
enum color { RED, GREEN = 5, BLUE };

/** Release a widget. */
void widget_free(widget_t *w);

/**
 * Area of a widget.
 * @param w The widget.
 */
int widget_area(widget_t *w) { return w->width; }

void widget_free(widget_t *w) { }

static void helper(void) { }
"#;

/// Location of the `nth` occurrence of `needle` in [`SOURCE`], in clang's
/// JSON shape.
fn pos(
    needle: &str,
    nth: usize,
) -> Value {
    let (offset, _) = SOURCE.match_indices(needle).nth(nth).expect("needle present");
    let line = SOURCE[..offset].matches('\n').count() + 1;
    let col = offset - SOURCE[..offset].rfind('\n').map_or(0, |i| i + 1) + 1;
    let tok_len = needle.chars().take_while(|c| c.is_ascii_alphanumeric() || *c == '_').count().max(1);
    json!({ "offset": offset, "file": FILE, "line": line, "col": col, "tokLen": tok_len })
}

fn span(
    begin: Value,
    end: Value,
) -> Value {
    json!({ "begin": begin, "end": end })
}

fn node(
    kind: &str,
    fields: Value,
    inner: Vec<Value>,
) -> Value {
    let mut object = json!({ "id": "0x1", "kind": kind });
    if let (Some(target), Value::Object(extra)) = (object.as_object_mut(), fields) {
        target.extend(extra);
    }
    if !inner.is_empty() {
        object["inner"] = Value::Array(inner);
    }
    object
}

fn parm(
    name: &str,
    qual_type: &str,
    at: Value,
) -> Value {
    node(
        "ParmVarDecl",
        json!({ "loc": at.clone(), "range": span(pos("widget_t *w", 0), at), "name": name, "type": { "qualType": qual_type } }),
        vec![],
    )
}

fn body() -> Value {
    node("CompoundStmt", json!({}), vec![])
}

fn widget_tree() -> Value {
    node(
        "TranslationUnitDecl",
        json!({ "loc": {}, "range": { "begin": {}, "end": {} } }),
        vec![
            node(
                "TypedefDecl",
                json!({ "loc": {}, "range": { "begin": {}, "end": {} }, "isImplicit": true, "name": "__int128_t", "type": { "qualType": "__int128" } }),
                vec![],
            ),
            node(
                "RecordDecl",
                json!({
                    "loc": pos("widget {", 0),
                    "range": span(pos("struct widget {", 0), pos("} widget_t", 0)),
                    "name": "widget",
                    "tagUsed": "struct",
                    "completeDefinition": true,
                }),
                vec![
                    node(
                        "FieldDecl",
                        json!({ "loc": pos("width;", 0), "range": span(pos("int width", 0), pos("width;", 0)), "name": "width", "type": { "qualType": "int" } }),
                        vec![],
                    ),
                    node(
                        "FieldDecl",
                        json!({ "loc": pos("next;", 0), "range": span(pos("struct widget *next", 0), pos("next;", 0)), "name": "next", "type": { "qualType": "struct widget *" } }),
                        vec![],
                    ),
                ],
            ),
            node(
                "TypedefDecl",
                json!({ "loc": pos("widget_t;", 0), "range": span(pos("typedef struct widget", 0), pos("widget_t;", 0)), "name": "widget_t", "type": { "qualType": "struct widget" } }),
                vec![],
            ),
            node(
                "RecordDecl",
                json!({
                    "loc": pos("struct {", 0),
                    "range": span(pos("struct {", 0), pos("} point_t", 0)),
                    "tagUsed": "struct",
                    "completeDefinition": true,
                }),
                vec![node(
                    "FieldDecl",
                    json!({ "loc": pos("x;", 0), "range": span(pos("int x", 0), pos("x;", 0)), "name": "x", "type": { "qualType": "int" } }),
                    vec![],
                )],
            ),
            node(
                "TypedefDecl",
                json!({ "loc": pos("point_t;", 0), "range": span(pos("typedef struct {", 0), pos("point_t;", 0)), "name": "point_t", "type": { "qualType": "struct point_t" } }),
                vec![],
            ),
            node(
                "EnumDecl",
                json!({ "loc": pos("color {", 0), "range": span(pos("enum color", 0), pos("};\n\n/** Release", 0)), "name": "color" }),
                vec![
                    node(
                        "EnumConstantDecl",
                        json!({ "loc": pos("RED", 0), "range": span(pos("RED", 0), pos("RED", 0)), "name": "RED", "type": { "qualType": "int" } }),
                        vec![],
                    ),
                    node(
                        "EnumConstantDecl",
                        json!({ "loc": pos("GREEN", 0), "range": span(pos("GREEN", 0), pos("5, BLUE", 0)), "name": "GREEN", "type": { "qualType": "int" } }),
                        vec![node("ConstantExpr", json!({ "value": "5" }), vec![node("IntegerLiteral", json!({ "value": "5" }), vec![])])],
                    ),
                    node(
                        "EnumConstantDecl",
                        json!({ "loc": pos("BLUE", 0), "range": span(pos("BLUE", 0), pos("BLUE", 0)), "name": "BLUE", "type": { "qualType": "int" } }),
                        vec![],
                    ),
                ],
            ),
            node(
                "FunctionDecl",
                json!({ "loc": pos("widget_free", 0), "range": span(pos("void widget_free", 0), pos("w);", 0)), "name": "widget_free", "type": { "qualType": "void (widget_t *)" } }),
                vec![parm("w", "widget_t *", pos("w);", 0))],
            ),
            node(
                "FunctionDecl",
                json!({ "loc": pos("widget_area", 0), "range": span(pos("int widget_area", 0), pos("w->width", 0)), "name": "widget_area", "type": { "qualType": "int (widget_t *)" } }),
                vec![parm("w", "widget_t *", pos("w) {", 0)), body()],
            ),
            node(
                "FunctionDecl",
                json!({ "loc": pos("widget_free", 1), "range": span(pos("void widget_free", 1), pos("w) {", 1)), "name": "widget_free", "type": { "qualType": "void (widget_t *)" } }),
                vec![parm("w", "widget_t *", pos("w) {", 1)), body()],
            ),
            node(
                "FunctionDecl",
                json!({ "loc": pos("helper(void)", 0), "range": span(pos("static void helper", 0), pos("helper(void)", 0)), "name": "helper", "storageClass": "static", "type": { "qualType": "void (void)" } }),
                vec![body()],
            ),
        ],
    )
}

/// Print `value` with clang's key order: `id` and `kind` open each node and
/// `inner` closes it; `offset` opens each source location. `Value` itself
/// sorts keys, which the node and location decoders reject.
fn clang_json(value: &Value) -> String {
    fn rank(key: &str) -> u8 {
        match key {
            "id" => 0,
            "kind" | "offset" => 1,
            "inner" => 3,
            _ => 2,
        }
    }

    match value {
        Value::Object(map) => {
            let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
            keys.sort_by_key(|key| rank(key));
            let fields: Vec<String> =
                keys.iter().map(|key| format!("{}:{}", Value::from(*key), clang_json(&map[*key]))).collect();
            format!("{{{}}}", fields.join(","))
        },
        Value::Array(items) => format!("[{}]", items.iter().map(clang_json).collect::<Vec<_>>().join(",")),
        other => other.to_string(),
    }
}

fn parse_tree(tree: &Value) -> Node {
    serde_json::from_str(&clang_json(tree)).expect("valid clang JSON")
}

#[test]
fn fixture_json_keeps_node_headers_first() {
    let tree = node("FieldDecl", json!({ "name": "x", "isImplicit": true }), vec![body()]);
    assert_eq!(
        clang_json(&tree),
        r#"{"id":"0x1","kind":"FieldDecl","isImplicit":true,"name":"x","inner":[{"id":"0x1","kind":"CompoundStmt"}]}"#
    );
}

fn widget_sources() -> SourceCache {
    let mut sources = SourceCache::default();
    sources.insert(FILE, SourceFile::new(SOURCE.to_owned()));
    sources
}

fn convert_widget() -> Cursor {
    let macros = vec![MacroDef {
        name: "WIDGET_MAX".to_owned(),
        file: FILE.to_owned(),
        line: 5,
    }];
    convert(&parse_tree(&widget_tree()), Path::new(FILE), &macros, &mut widget_sources())
}

#[test]
fn root_lists_declarations_in_source_order() {
    let root = convert_widget();

    assert_eq!(root.kind, CursorKind::TranslationUnit);
    assert_eq!(root.spelling, FILE);
    assert_eq!(root.location, None);

    let kinds: Vec<CursorKind> = root.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CursorKind::StructDecl,
            CursorKind::TypedefDecl,
            CursorKind::StructDecl,
            CursorKind::TypedefDecl,
            CursorKind::EnumDecl,
            CursorKind::FunctionDecl,
            CursorKind::FunctionDecl,
            CursorKind::FunctionDecl,
            CursorKind::FunctionDecl,
            CursorKind::MacroDefinition,
        ]
    );
}

#[test]
fn symbol_identities() {
    let root = convert_widget();
    let usrs: Vec<Option<&str>> = root.children.iter().map(|c| c.usr.as_deref()).collect();

    assert_eq!(
        usrs,
        vec![
            Some("c:@S@widget"),
            Some("c:widget.c@T@widget_t"),
            Some("c:@SA@point_t"),
            Some("c:widget.c@T@point_t"),
            Some("c:@E@color"),
            Some("c:@F@widget_free"),
            Some("c:@F@widget_area"),
            Some("c:@F@widget_free"),
            Some("c:widget.c@F@helper"),
            Some("c:widget.c@macro@WIDGET_MAX"),
        ]
    );
}

#[test]
fn definition_status() {
    let root = convert_widget();
    let children = &root.children;

    assert!(children[0].is_definition, "complete struct");
    assert!(children[1].is_definition, "typedef");
    assert!(children[4].is_definition, "enum with constants");
    assert!(!children[5].is_definition, "prototype");
    assert!(children[6].is_definition, "function with body");
    assert!(!children[9].is_definition, "macros are never definitions");
}

#[test]
fn comments_attach_to_declarations() {
    let root = convert_widget();
    let children = &root.children;

    assert_eq!(children[1].raw_comment.as_deref(), Some("/** A widget. */"));
    assert_eq!(children[0].raw_comment.as_deref(), Some("/** A widget. */"), "struct borrows its typedef's comment");
    assert_eq!(children[2].raw_comment.as_deref(), Some("/** A point. */"));
    assert_eq!(children[4].raw_comment.as_deref(), Some("/** Colors. */"));
    assert_eq!(
        children[6].raw_comment.as_deref(),
        Some("/**\n * Area of a widget.\n * @param w The widget.\n */")
    );
    assert_eq!(children[9].raw_comment.as_deref(), Some("/** Maximum widget count. */"));
    assert_eq!(children[8].raw_comment, None);
}

#[test]
fn definition_inherits_comment_from_earlier_redeclaration() {
    let root = convert_widget();

    assert_eq!(root.children[7].spelling, "widget_free");
    assert!(root.children[7].is_definition);
    assert_eq!(root.children[7].raw_comment.as_deref(), Some("/** Release a widget. */"));
}

#[test]
fn fields_carry_types_and_trailing_comments() {
    let root = convert_widget();
    let fields: Vec<&Cursor> = root.children[0].fields().collect();

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].spelling, "width");
    assert_eq!(fields[0].raw_comment.as_deref(), Some("/**< Width in pixels. */"));
    assert_eq!(fields[0].ty, Some(TypeRef::named("int")));

    assert_eq!(fields[1].spelling, "next");
    assert_eq!(fields[1].raw_comment, None);
    let next = fields[1].ty.as_ref().expect("field type");
    assert_eq!(next.spelling, "struct widget *");
    let pointee = next.pointee().expect("pointer");
    assert_eq!(pointee.spelling, "struct widget");
    assert_eq!(
        pointee.declaration(),
        Some(&TypeDeclaration {
            usr: Some("c:@S@widget".to_owned()),
            location: Some(Location::new(FILE, 8, 16)),
        })
    );
}

#[test]
fn function_parameters_and_result() {
    let root = convert_widget();
    let area = &root.children[6];

    assert_eq!(area.result_type, Some(TypeRef::named("int")));
    let params: Vec<&Cursor> = area.arguments().collect();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].spelling, "w");

    let ty = params[0].ty.as_ref().expect("parameter type");
    assert_eq!(ty.spelling, "widget_t *");
    assert_eq!(
        ty.pointee().and_then(|p| p.declaration()).and_then(|d| d.usr.as_deref()),
        Some("c:widget.c@T@widget_t")
    );
}

#[test]
fn typedef_canonical_types() {
    let root = convert_widget();

    let widget_t = root.children[1].canonical_type.as_ref().expect("canonical type");
    assert_eq!(widget_t.spelling, "struct widget");
    assert_eq!(widget_t.declaration().and_then(|d| d.usr.as_deref()), Some("c:@S@widget"));

    let point_t = root.children[3].canonical_type.as_ref().expect("canonical type");
    assert_eq!(point_t.declaration().and_then(|d| d.usr.as_deref()), Some("c:@SA@point_t"));
}

#[test]
fn enum_values_count_up_from_explicit_initializers() {
    let root = convert_widget();
    let constants: Vec<(&str, Option<i64>)> =
        root.children[4].children.iter().map(|c| (c.spelling.as_str(), c.enum_value)).collect();

    assert_eq!(constants, vec![("RED", Some(0)), ("GREEN", Some(5)), ("BLUE", Some(6))]);
}

#[test]
fn macro_location_points_at_the_name() {
    let root = convert_widget();
    let max = root.children.last().expect("macro cursor");

    assert_eq!(max.spelling, "WIDGET_MAX");
    assert_eq!(max.location, Some(Location::new(FILE, 5, 9)));
}

#[test]
fn unnamed_tag_spellings_resolve_by_position() {
    let mut sources = widget_sources();
    let root = parse_tree(&widget_tree());
    let mut converter = Converter {
        sources: &mut sources,
        paths: PathCache::default(),
        index: TypeIndex::default(),
        comments: HashMap::new(),
    };
    converter.index_scope(&root.inner, "");

    let ty = converter.type_ref("const struct (unnamed struct at /work/src/widget.c:14:9) *");
    let decl = ty.pointee().and_then(|p| p.declaration()).expect("declaration");
    assert_eq!(decl.usr.as_deref(), Some("c:@SA@point_t"));

    assert_eq!(converter.type_ref("size_t").declaration(), None);
    assert_eq!(converter.type_ref("unsigned int").declaration(), None);
}

#[test]
fn typedef_chains_are_followed() {
    let mut sources = SourceCache::default();
    let tree = node(
        "TranslationUnitDecl",
        json!({}),
        vec![
            node("TypedefDecl", json!({ "name": "handle_t", "type": { "qualType": "struct widget *" } }), vec![]),
            node("TypedefDecl", json!({ "name": "ref_t", "type": { "qualType": "handle_t" } }), vec![]),
            node("TypedefDecl", json!({ "name": "refs_t", "type": { "qualType": "const ref_t *" } }), vec![]),
        ],
    );
    let root = parse_tree(&tree);
    let mut converter = Converter {
        sources: &mut sources,
        paths: PathCache::default(),
        index: TypeIndex::default(),
        comments: HashMap::new(),
    };
    converter.index_scope(&root.inner, "");

    assert_eq!(converter.canonical_spelling("refs_t", "const ref_t *", None), "const struct widget * *");
    assert_eq!(converter.canonical_spelling("ref_t", "handle_t", None), "struct widget *");
}

#[test]
fn namespaces_scope_identities() {
    let text = "namespace gfx {\nstruct Surface { int w; };\nvoid draw(Surface *s) {}\n}\n";
    let file = "/work/src/gfx.cpp";
    let at = |needle: &str| {
        let offset = text.find(needle).expect("needle present");
        let line = text[..offset].matches('\n').count() + 1;
        let col = offset - text[..offset].rfind('\n').map_or(0, |i| i + 1) + 1;
        json!({ "offset": offset, "file": file, "line": line, "col": col, "tokLen": 1 })
    };
    let tree = node(
        "TranslationUnitDecl",
        json!({}),
        vec![node(
            "NamespaceDecl",
            json!({ "loc": at("gfx"), "range": span(at("namespace"), at("}\n")), "name": "gfx" }),
            vec![
                node(
                    "CXXRecordDecl",
                    json!({ "loc": at("Surface {"), "range": span(at("struct Surface"), at("};")), "name": "Surface", "tagUsed": "struct", "completeDefinition": true }),
                    vec![node(
                        "CXXRecordDecl",
                        json!({ "loc": at("Surface {"), "range": span(at("struct Surface"), at("Surface {")), "isImplicit": true, "name": "Surface", "tagUsed": "struct" }),
                        vec![],
                    )],
                ),
                node(
                    "FunctionDecl",
                    json!({ "loc": at("draw"), "range": span(at("void draw"), at("{}")), "name": "draw", "type": { "qualType": "void (Surface *)" } }),
                    vec![
                        node("ParmVarDecl", json!({ "loc": at("s)"), "name": "s", "type": { "qualType": "gfx::Surface *" } }), vec![]),
                        node("CompoundStmt", json!({}), vec![]),
                    ],
                ),
            ],
        )],
    );

    let root = convert(&parse_tree(&tree), Path::new(file), &[], &mut SourceCache::default());
    let namespace = &root.children[0];
    assert_eq!(namespace.kind, CursorKind::Namespace);
    assert!(!namespace.is_definition);

    let surface = &namespace.children[0];
    assert_eq!(surface.usr.as_deref(), Some("c:@N@gfx@S@Surface"));
    assert!(surface.children.is_empty(), "implicit self-reference dropped");

    let draw = &namespace.children[1];
    assert_eq!(draw.usr.as_deref(), Some("c:@N@gfx@F@draw"));
    let param = draw.arguments().next().and_then(|p| p.ty.as_ref()).expect("parameter type");
    assert_eq!(
        param.pointee().and_then(|p| p.declaration()).and_then(|d| d.usr.as_deref()),
        Some("c:@N@gfx@S@Surface")
    );
}

#[test]
fn anonymous_enums_are_named_by_their_first_constant() {
    let text = "/** Widget flags. */\nenum { FLAG_A = 1, FLAG_B = 2 };\n";
    let file = "/work/src/flags.h";
    let at = |needle: &str| {
        let offset = text.find(needle).expect("needle present");
        let line = text[..offset].matches('\n').count() + 1;
        let col = offset - text[..offset].rfind('\n').map_or(0, |i| i + 1) + 1;
        json!({ "offset": offset, "file": file, "line": line, "col": col, "tokLen": 1 })
    };
    let constant = |name: &str, value: &str| {
        node(
            "EnumConstantDecl",
            json!({ "loc": at(name), "range": span(at(name), at(value)), "name": name, "type": { "qualType": "int" } }),
            vec![node("ConstantExpr", json!({ "value": value }), vec![])],
        )
    };
    let tree = node(
        "TranslationUnitDecl",
        json!({}),
        vec![node(
            "EnumDecl",
            json!({ "loc": at("enum {"), "range": span(at("enum {"), at("};")) }),
            vec![constant("FLAG_A", "1"), constant("FLAG_B", "2")],
        )],
    );
    let mut sources = SourceCache::default();
    sources.insert(file, SourceFile::new(text.to_owned()));

    let root = convert(&parse_tree(&tree), Path::new(file), &[], &mut sources);
    let flags = &root.children[0];
    assert_eq!(flags.kind, CursorKind::EnumDecl);
    assert_eq!(flags.usr.as_deref(), Some("c:@Ea@FLAG_A"));
    assert!(flags.is_definition);
    assert_eq!(flags.raw_comment.as_deref(), Some("/** Widget flags. */"));

    let values: Vec<_> = flags.children.iter().map(|c| (c.spelling.as_str(), c.enum_value)).collect();
    assert_eq!(values, [("FLAG_A", Some(1)), ("FLAG_B", Some(2))]);
}
