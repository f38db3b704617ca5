use hydrate::{AutoMapPolicy, Config, Engine, RowWindow, UnknownColumnPolicy, Value};

use hydrate_core::row::{MemoryResultSets, MemoryRows, SourceType};
use hydrate_core::schema::{
    Catalog, MappingSchema, PropertyMapping, StatementId, StatementSpec, TypeDescriptor,
};
use hydrate_core::values;

use pretty_assertions::assert_eq;

fn user_descriptor() -> TypeDescriptor {
    TypeDescriptor::record("User")
        .property("id", SourceType::I64)
        .property("name", SourceType::String)
        .property("nickName", SourceType::String)
}

fn statement(name: &str) -> StatementId {
    StatementId::from(name)
}

fn user_rows() -> MemoryRows {
    MemoryRows::new([("id", SourceType::I64), ("name", SourceType::String)])
        .row(values![1_i64, "A"])
        .row(values![2_i64, "B"])
}

#[test]
fn explicit_mappings_bind_columns() {
    let catalog = Catalog::builder()
        .descriptor(user_descriptor())
        .schema(
            MappingSchema::new("userMap", "User")
                .property(PropertyMapping::identity("id", "id"))
                .property(PropertyMapping::column("name", "name")),
        )
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), user_rows()).unwrap();

    assert_eq!(batch.rows.len(), 2);
    assert_eq!(batch.property(&batch.rows[0], "name"), &Value::from("A"));
    assert_eq!(batch.property(&batch.rows[1], "id"), &Value::I64(2));
}

#[test]
fn automatic_mapping_binds_unmapped_columns() {
    let catalog = Catalog::builder()
        .descriptor(user_descriptor())
        .schema(MappingSchema::new("userMap", "User"))
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), user_rows()).unwrap();

    assert_eq!(batch.rows.len(), 2);
    assert_eq!(batch.property(&batch.rows[0], "id"), &Value::I64(1));
    assert_eq!(batch.property(&batch.rows[0], "name"), &Value::from("A"));
}

#[test]
fn disabled_automatic_mapping_finds_nothing() {
    let catalog = Catalog::builder()
        .descriptor(user_descriptor())
        .schema(MappingSchema::new("userMap", "User"))
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let engine = Engine::new(catalog).config(Config::new().auto_mapping(AutoMapPolicy::None));
    let batch = engine.execute(&statement("selectUsers"), user_rows()).unwrap();

    // Nothing binds, so every row reports absence.
    assert_eq!(batch.rows, vec![Value::Null, Value::Null]);
}

#[test]
fn per_schema_override_beats_the_global_policy() {
    let catalog = Catalog::builder()
        .descriptor(user_descriptor())
        .schema(MappingSchema::new("userMap", "User").auto_mapping(true))
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let engine = Engine::new(catalog).config(Config::new().auto_mapping(AutoMapPolicy::None));
    let batch = engine.execute(&statement("selectUsers"), user_rows()).unwrap();
    assert_eq!(batch.property(&batch.rows[0], "name"), &Value::from("A"));
}

#[test]
fn snake_case_columns_normalize_to_camel_case() {
    let catalog = Catalog::builder()
        .descriptor(user_descriptor())
        .schema(MappingSchema::new("userMap", "User"))
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let rows = MemoryRows::new([("nick_name", SourceType::String)]).row(values!["ada"]);
    let engine = Engine::new(catalog).config(Config::new().snake_to_camel(true));
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();

    assert_eq!(batch.property(&batch.rows[0], "nickName"), &Value::from("ada"));
}

#[test]
fn unknown_column_policy_actions() {
    let _ = env_logger::builder().is_test(true).try_init();
    let build = || {
        Catalog::builder()
            .descriptor(user_descriptor())
            .schema(MappingSchema::new("userMap", "User"))
            .statement(StatementSpec::new("selectUsers").schema("userMap"))
            .build()
            .unwrap()
    };
    let rows = || {
        MemoryRows::new([("id", SourceType::I64), ("mystery", SourceType::String)])
            .row(values![1_i64, "?"])
    };

    // The default ignores; warn continues too.
    for policy in [UnknownColumnPolicy::Ignore, UnknownColumnPolicy::Warn] {
        let engine = Engine::new(build()).config(Config::new().unknown_columns(policy));
        let batch = engine.execute(&statement("selectUsers"), rows()).unwrap();
        assert_eq!(batch.property(&batch.rows[0], "id"), &Value::I64(1));
    }

    let engine =
        Engine::new(build()).config(Config::new().unknown_columns(UnknownColumnPolicy::Fail));
    let err = engine
        .execute(&statement("selectUsers"), rows())
        .unwrap_err();
    assert!(err.is_unknown_column());
}

#[test]
fn nulls_bind_only_when_configured_and_nullable() {
    let descriptor = TypeDescriptor::record("User")
        .property("id", SourceType::I64)
        .property("name", SourceType::String)
        .primitive("age", SourceType::I64);
    let build = || {
        Catalog::builder()
            .descriptor(descriptor.clone())
            .schema(
                MappingSchema::new("userMap", "User")
                    .property(PropertyMapping::identity("id", "id"))
                    .property(PropertyMapping::column("name", "name"))
                    .property(PropertyMapping::column("age", "age")),
            )
            .statement(StatementSpec::new("selectUsers").schema("userMap"))
            .build()
            .unwrap()
    };
    let rows = || {
        MemoryRows::new([
            ("id", SourceType::I64),
            ("name", SourceType::String),
            ("age", SourceType::I64),
        ])
        .row(values![1_i64, Value::Null, Value::Null])
    };

    let engine = Engine::new(build());
    let batch = engine.execute(&statement("selectUsers"), rows()).unwrap();
    let user = batch.rows[0].expect_object();
    let bound: Vec<&str> = batch.graph[user].properties().map(|(k, _)| k).collect();
    assert_eq!(bound, vec!["id"]);

    let engine = Engine::new(build()).config(Config::new().bind_nulls(true));
    let batch = engine.execute(&statement("selectUsers"), rows()).unwrap();
    let user = batch.rows[0].expect_object();
    let bound: Vec<&str> = batch.graph[user].properties().map(|(k, _)| k).collect();
    // The primitive slot never receives the null write.
    assert_eq!(bound, vec!["id", "name"]);
}

#[test]
fn empty_row_substitution_returns_an_instance() {
    let build = || {
        Catalog::builder()
            .descriptor(user_descriptor())
            .schema(
                MappingSchema::new("userMap", "User")
                    .property(PropertyMapping::column("name", "name")),
            )
            .statement(StatementSpec::new("selectUsers").schema("userMap"))
            .build()
            .unwrap()
    };
    let rows = || MemoryRows::new([("name", SourceType::String)]).row(values![Value::Null]);

    let engine = Engine::new(build());
    let batch = engine.execute(&statement("selectUsers"), rows()).unwrap();
    assert_eq!(batch.rows, vec![Value::Null]);

    let engine = Engine::new(build()).config(Config::new().instance_for_empty_row(true));
    let batch = engine.execute(&statement("selectUsers"), rows()).unwrap();
    assert!(batch.rows[0].is_object());
}

#[test]
fn scalar_schemas_collapse_the_row() {
    let catalog = Catalog::builder()
        .descriptor(TypeDescriptor::scalar("Name", SourceType::String))
        .schema(MappingSchema::new("nameMap", "Name"))
        .statement(StatementSpec::new("selectNames").schema("nameMap"))
        .build()
        .unwrap();

    let rows = MemoryRows::new([("name", SourceType::String)])
        .row(values!["A"])
        .row(values![Value::Null])
        .row(values!["B"]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectNames"), rows).unwrap();

    assert_eq!(
        batch.rows,
        vec![Value::from("A"), Value::Null, Value::from("B")]
    );
}

#[test]
fn map_destinations_accept_every_column() {
    let catalog = Catalog::builder()
        .descriptor(TypeDescriptor::map("Row"))
        .schema(MappingSchema::new("rowMap", "Row"))
        .statement(StatementSpec::new("selectRows").schema("rowMap"))
        .build()
        .unwrap();

    let rows = MemoryRows::new([("a", SourceType::I64), ("b", SourceType::String)])
        .row(values![1_i64, "x"]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectRows"), rows).unwrap();

    assert_eq!(batch.property(&batch.rows[0], "a"), &Value::I64(1));
    assert_eq!(batch.property(&batch.rows[0], "b"), &Value::from("x"));
}

#[test]
fn row_window_skips_and_limits() {
    let catalog = Catalog::builder()
        .descriptor(user_descriptor())
        .schema(MappingSchema::new("userMap", "User"))
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();
    let rows = MemoryRows::new([("id", SourceType::I64)])
        .row(values![1_i64])
        .row(values![2_i64])
        .row(values![3_i64])
        .row(values![4_i64]);

    let engine = Engine::new(catalog);
    let mut seen = vec![];
    let graph = engine
        .execute_with(
            &statement("selectUsers"),
            rows,
            RowWindow::new(1, 2),
            &mut |value: Value, _: &hydrate::ObjectGraph, _: &mut hydrate::ConsumeContext| -> hydrate::Result<()> {
                seen.push(value);
                Ok(())
            },
        )
        .unwrap();

    assert_eq!(seen.len(), 2);
    assert_eq!(graph.property(seen[0].expect_object(), "id"), &Value::I64(2));
    assert_eq!(graph.property(seen[1].expect_object(), "id"), &Value::I64(3));
}

#[test]
fn consumer_stop_halts_the_scan() {
    let catalog = Catalog::builder()
        .descriptor(user_descriptor())
        .schema(MappingSchema::new("userMap", "User"))
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let engine = Engine::new(catalog);
    let mut seen = 0;
    engine
        .execute_with(
            &statement("selectUsers"),
            user_rows(),
            RowWindow::DEFAULT,
            &mut |_: Value, _: &hydrate::ObjectGraph, cx: &mut hydrate::ConsumeContext| -> hydrate::Result<()> {
                seen += 1;
                cx.stop();
                Ok(())
            },
        )
        .unwrap();
    assert_eq!(seen, 1);
}

#[test]
fn multiple_result_sets_map_positionally() {
    let catalog = Catalog::builder()
        .descriptor(user_descriptor())
        .descriptor(TypeDescriptor::scalar("Name", SourceType::String))
        .schema(MappingSchema::new("userMap", "User"))
        .schema(MappingSchema::new("nameMap", "Name"))
        .statement(
            StatementSpec::new("selectBoth")
                .schema("userMap")
                .schema("nameMap"),
        )
        .build()
        .unwrap();

    let mut sets = MemoryResultSets::new()
        .result_set(MemoryRows::new([("id", SourceType::I64)]).row(values![1_i64]))
        .spurious()
        .result_set(MemoryRows::new([("name", SourceType::String)]).row(values!["A"]));

    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectBoth"), &mut sets).unwrap();

    assert_eq!(batch.rows.len(), 2);
    assert!(batch.rows[0].is_object());
    assert_eq!(batch.rows[1], Value::from("A"));

    // The source is released exactly once, even through the spurious
    // transition.
    assert_eq!(sets.close_count(), 1);
    assert!(sets.all_released());
}

#[test]
fn statement_without_schemas_is_fatal() {
    let catalog = Catalog::builder()
        .statement(StatementSpec::new("selectNothing"))
        .build()
        .unwrap();
    let engine = Engine::new(catalog);
    let err = engine
        .execute(&statement("selectNothing"), user_rows())
        .unwrap_err();
    assert!(err.to_string().contains("no mapping schema found"));
}
