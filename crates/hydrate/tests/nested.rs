use hydrate::{Config, Engine, RowWindow, Value};

use hydrate_core::row::{MemoryRows, SourceType};
use hydrate_core::schema::{
    Catalog, MappingSchema, PropertyMapping, StatementId, StatementSpec, TypeDescriptor,
};
use hydrate_core::values;

use pretty_assertions::assert_eq;

fn statement(name: &str) -> StatementId {
    StatementId::from(name)
}

/// User with a scalar tag collection joined onto every row.
fn tagged_user_catalog(ordered: bool) -> Catalog {
    let mut spec = StatementSpec::new("selectUsers").schema("userMap");
    if ordered {
        spec = spec.ordered();
    }
    Catalog::builder()
        .descriptor(
            TypeDescriptor::record("User")
                .property("id", SourceType::I64)
                .property("name", SourceType::String)
                .collection("tags"),
        )
        .descriptor(TypeDescriptor::scalar("Tag", SourceType::String))
        .schema(MappingSchema::new("tagMap", "Tag").property(PropertyMapping::column("value", "tag")))
        .schema(
            MappingSchema::new("userMap", "User")
                .property(PropertyMapping::identity("id", "id"))
                .property(PropertyMapping::column("name", "name"))
                .property(PropertyMapping::nested("tags", "tagMap")),
        )
        .statement(spec)
        .build()
        .unwrap()
}

fn tagged_user_rows() -> MemoryRows {
    MemoryRows::new([
        ("id", SourceType::I64),
        ("name", SourceType::String),
        ("tag", SourceType::String),
    ])
    .row(values![1_i64, "A", Value::Null])
    .row(values![1_i64, "A", "x"])
    .row(values![2_i64, "B", Value::Null])
}

fn tags(batch: &hydrate::ResultBatch, row: &Value) -> Vec<Value> {
    batch.property(row, "tags").expect_list().to_vec()
}

#[test]
fn join_rows_collapse_into_one_parent() {
    let engine = Engine::new(tagged_user_catalog(false));
    let batch = engine
        .execute(&statement("selectUsers"), tagged_user_rows())
        .unwrap();

    assert_eq!(batch.rows.len(), 2);
    assert_eq!(batch.property(&batch.rows[0], "name"), &Value::from("A"));
    assert_eq!(tags(&batch, &batch.rows[0]), vec![Value::from("x")]);
    // The null-tag rows never contribute a child, but the collection slot
    // still exists.
    assert_eq!(tags(&batch, &batch.rows[1]), vec![]);
}

#[test]
fn children_append_in_row_order() {
    let rows = MemoryRows::new([("id", SourceType::I64), ("tag", SourceType::String)])
        .row(values![1_i64, "a"])
        .row(values![1_i64, "b"])
        .row(values![1_i64, "c"]);
    let engine = Engine::new(tagged_user_catalog(false));
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();

    assert_eq!(batch.rows.len(), 1);
    assert_eq!(
        tags(&batch, &batch.rows[0]),
        vec![Value::from("a"), Value::from("b"), Value::from("c")]
    );
}

#[test]
fn ordered_mode_flushes_on_identity_boundaries() {
    let rows = || {
        MemoryRows::new([("id", SourceType::I64), ("tag", SourceType::String)])
            .row(values![1_i64, "a"])
            .row(values![1_i64, "b"])
            .row(values![2_i64, "c"])
            .row(values![1_i64, "d"])
    };

    // Unordered retains the cache for the whole result set: the late id=1
    // row merges back into the first parent.
    let engine = Engine::new(tagged_user_catalog(false));
    let batch = engine.execute(&statement("selectUsers"), rows()).unwrap();
    assert_eq!(batch.rows.len(), 2);
    assert_eq!(
        tags(&batch, &batch.rows[0]),
        vec![Value::from("a"), Value::from("b"), Value::from("d")]
    );

    // Ordered drops the cache at each boundary: the late id=1 row starts a
    // new parent.
    let engine = Engine::new(tagged_user_catalog(true));
    let batch = engine.execute(&statement("selectUsers"), rows()).unwrap();
    assert_eq!(batch.rows.len(), 3);
    assert_eq!(
        tags(&batch, &batch.rows[0]),
        vec![Value::from("a"), Value::from("b")]
    );
    assert_eq!(tags(&batch, &batch.rows[1]), vec![Value::from("c")]);
    assert_eq!(tags(&batch, &batch.rows[2]), vec![Value::from("d")]);
}

#[test]
fn degenerate_identity_disables_deduplication() {
    // The identity column is absent from the result set, so every row keys
    // to null and materializes its own parent.
    let catalog = Catalog::builder()
        .descriptor(
            TypeDescriptor::record("User")
                .property("name", SourceType::String)
                .collection("tags"),
        )
        .descriptor(TypeDescriptor::scalar("Tag", SourceType::String))
        .schema(MappingSchema::new("tagMap", "Tag").property(PropertyMapping::column("value", "tag")))
        .schema(
            MappingSchema::new("userMap", "User")
                .property(PropertyMapping::identity("uid", "uid"))
                .property(PropertyMapping::column("name", "name"))
                .property(PropertyMapping::nested("tags", "tagMap")),
        )
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let rows = MemoryRows::new([("name", SourceType::String), ("tag", SourceType::String)])
        .row(values!["A", "x"])
        .row(values!["A", "y"]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();

    assert_eq!(batch.rows.len(), 2);
    assert_eq!(tags(&batch, &batch.rows[0]), vec![Value::from("x")]);
    assert_eq!(tags(&batch, &batch.rows[1]), vec![Value::from("y")]);
}

fn blog_author_catalog(gate: bool) -> Catalog {
    let mut author = PropertyMapping::nested("author", "authorMap").prefix("a_");
    if gate {
        author = author.not_null(["id"]);
    }
    Catalog::builder()
        .descriptor(
            TypeDescriptor::record("Blog")
                .property("id", SourceType::I64)
                .property("author", SourceType::Object),
        )
        .descriptor(
            TypeDescriptor::record("Author")
                .property("id", SourceType::I64)
                .property("name", SourceType::String)
                .property("blog", SourceType::Object),
        )
        .schema(
            MappingSchema::new("authorMap", "Author")
                .property(PropertyMapping::identity("id", "id"))
                .property(PropertyMapping::column("name", "name"))
                .property(PropertyMapping::nested("blog", "blogMap")),
        )
        .schema(
            MappingSchema::new("blogMap", "Blog")
                .property(PropertyMapping::identity("id", "id"))
                .property(author),
        )
        .statement(StatementSpec::new("selectBlogs").schema("blogMap"))
        .build()
        .unwrap()
}

fn blog_rows() -> MemoryRows {
    MemoryRows::new([
        ("id", SourceType::I64),
        ("a_id", SourceType::I64),
        ("a_name", SourceType::String),
    ])
    .row(values![1_i64, 10_i64, "ada"])
    .row(values![2_i64, Value::Null, "ghost"])
}

#[test]
fn circular_reference_binds_the_ancestor() {
    let engine = Engine::new(blog_author_catalog(false));
    let batch = engine.execute(&statement("selectBlogs"), blog_rows()).unwrap();

    let blog = batch.rows[0].expect_object();
    let author = batch.graph.property(blog, "author").expect_object();
    assert_eq!(batch.graph.property(author, "name"), &Value::from("ada"));
    // The author's back-reference resolves against the construction stack
    // instead of recursing forever.
    assert_eq!(batch.graph.property(author, "blog"), &Value::Object(blog));
}

#[test]
fn not_null_gate_blocks_child_creation() {
    let engine = Engine::new(blog_author_catalog(true));
    let batch = engine.execute(&statement("selectBlogs"), blog_rows()).unwrap();

    assert_eq!(batch.rows.len(), 2);
    assert!(batch.property(&batch.rows[0], "author").is_object());
    // Row two carries a_name but the gated column is null, so no author is
    // materialized for it.
    assert_eq!(batch.property(&batch.rows[1], "author"), &Value::Null);
}

#[test]
fn row_window_on_nested_requires_opt_in() {
    let mut sink = hydrate::Collector::new();
    let engine = Engine::new(tagged_user_catalog(true));
    let err = engine
        .execute_with(
            &statement("selectUsers"),
            tagged_user_rows(),
            RowWindow::new(0, 1),
            &mut sink,
        )
        .unwrap_err();
    assert!(err.to_string().contains("row window"));

    let engine = Engine::new(tagged_user_catalog(true))
        .config(Config::new().allow_row_window_on_nested(true));
    let mut seen = 0;
    engine
        .execute_with(
            &statement("selectUsers"),
            tagged_user_rows(),
            RowWindow::new(0, 1),
            &mut |_: Value, _: &hydrate::ObjectGraph, _: &mut hydrate::ConsumeContext| -> hydrate::Result<()> {
                seen += 1;
                Ok(())
            },
        )
        .unwrap();
    assert_eq!(seen, 1);
}

#[test]
fn custom_consumer_on_unordered_nested_requires_opt_in() {
    let noop = |_: Value,
                _: &hydrate::ObjectGraph,
                _: &mut hydrate::ConsumeContext|
     -> hydrate::Result<()> { Ok(()) };

    let engine = Engine::new(tagged_user_catalog(false));
    let err = engine
        .execute_with(
            &statement("selectUsers"),
            tagged_user_rows(),
            RowWindow::DEFAULT,
            &mut { noop },
        )
        .unwrap_err();
    assert!(err.to_string().contains("ordered"));

    // Declared ordered: fine.
    let engine = Engine::new(tagged_user_catalog(true));
    engine
        .execute_with(
            &statement("selectUsers"),
            tagged_user_rows(),
            RowWindow::DEFAULT,
            &mut { noop },
        )
        .unwrap();

    // Unordered, explicitly allowed: fine.
    let engine = Engine::new(tagged_user_catalog(false))
        .config(Config::new().allow_consumer_on_unordered_nested(true));
    engine
        .execute_with(
            &statement("selectUsers"),
            tagged_user_rows(),
            RowWindow::DEFAULT,
            &mut { noop },
        )
        .unwrap();
}

#[test]
fn ordered_mode_with_contiguous_rows_matches_unordered_output() {
    for ordered in [false, true] {
        let engine = Engine::new(tagged_user_catalog(ordered));
        let batch = engine
            .execute(&statement("selectUsers"), tagged_user_rows())
            .unwrap();
        assert_eq!(batch.rows.len(), 2, "ordered={ordered}");
        assert_eq!(tags(&batch, &batch.rows[0]), vec![Value::from("x")]);
        assert_eq!(tags(&batch, &batch.rows[1]), vec![]);
    }
}
