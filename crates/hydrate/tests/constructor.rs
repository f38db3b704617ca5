use hydrate::{Engine, Value};

use hydrate_core::row::{MemoryRows, SourceType};
use hydrate_core::schema::{
    Catalog, Discriminator, MappingSchema, PropertyMapping, StatementId, StatementSpec,
    TypeDescriptor,
};
use hydrate_core::values;

use pretty_assertions::assert_eq;

fn statement(name: &str) -> StatementId {
    StatementId::from(name)
}

#[test]
fn declared_constructor_mappings_build_the_object() {
    let catalog = Catalog::builder()
        .descriptor(
            TypeDescriptor::record("User")
                .property("id", SourceType::I64)
                .property("name", SourceType::String)
                .constructor([("id", SourceType::I64), ("name", SourceType::String)]),
        )
        .schema(
            MappingSchema::new("userMap", "User")
                .property(PropertyMapping::column("id", "id").constructor())
                .property(PropertyMapping::column("name", "name").constructor()),
        )
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let rows = MemoryRows::new([("id", SourceType::I64), ("name", SourceType::String)])
        .row(values![1_i64, "A"]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();

    let user = batch.rows[0].expect_object();
    assert_eq!(batch.graph.property(user, "id"), &Value::I64(1));
    assert_eq!(batch.graph.property(user, "name"), &Value::from("A"));
    // Constructor columns are claimed; automatic mapping does not re-apply
    // them as setters.
    let bound: Vec<&str> = batch.graph[user].properties().map(|(k, _)| k).collect();
    assert_eq!(bound, vec!["id", "name"]);
}

#[test]
fn all_null_constructor_arguments_yield_absence() {
    let catalog = Catalog::builder()
        .descriptor(
            TypeDescriptor::record("User")
                .property("id", SourceType::I64)
                .constructor([("id", SourceType::I64)]),
        )
        .schema(
            MappingSchema::new("userMap", "User")
                .property(PropertyMapping::column("id", "id").constructor()),
        )
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let rows = MemoryRows::new([("id", SourceType::I64)]).row(values![Value::Null]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();
    assert_eq!(batch.rows, vec![Value::Null]);
}

#[test]
fn constructor_arguments_mix_with_setter_mappings() {
    let catalog = Catalog::builder()
        .descriptor(
            TypeDescriptor::record("User")
                .property("id", SourceType::I64)
                .property("name", SourceType::String)
                .constructor([("id", SourceType::I64)]),
        )
        .schema(
            MappingSchema::new("userMap", "User")
                .property(PropertyMapping::column("id", "id").constructor())
                .property(PropertyMapping::column("name", "name")),
        )
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap();

    let rows = MemoryRows::new([("id", SourceType::I64), ("name", SourceType::String)])
        .row(values![7_i64, "B"]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();

    let user = batch.rows[0].expect_object();
    assert_eq!(batch.graph.property(user, "id"), &Value::I64(7));
    assert_eq!(batch.graph.property(user, "name"), &Value::from("B"));
}

#[test]
fn nested_schema_constructor_argument() {
    let catalog = Catalog::builder()
        .descriptor(
            TypeDescriptor::record("Blog")
                .property("id", SourceType::I64)
                .property("author", SourceType::Object)
                .constructor([("id", SourceType::I64), ("author", SourceType::Object)]),
        )
        .descriptor(
            TypeDescriptor::record("Author")
                .property("id", SourceType::I64)
                .property("name", SourceType::String),
        )
        .schema(
            MappingSchema::new("authorMap", "Author")
                .property(PropertyMapping::column("id", "id"))
                .property(PropertyMapping::column("name", "name")),
        )
        .schema(
            MappingSchema::new("blogMap", "Blog")
                .property(PropertyMapping::column("id", "id").constructor())
                .property(
                    PropertyMapping::nested("author", "authorMap")
                        .prefix("a_")
                        .constructor(),
                ),
        )
        .statement(StatementSpec::new("selectBlogs").schema("blogMap"))
        .build()
        .unwrap();

    let rows = MemoryRows::new([
        ("id", SourceType::I64),
        ("a_id", SourceType::I64),
        ("a_name", SourceType::String),
    ])
    .row(values![1_i64, 10_i64, "ada"]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectBlogs"), rows).unwrap();

    let blog = batch.rows[0].expect_object();
    assert_eq!(batch.graph.property(blog, "id"), &Value::I64(1));
    let author = batch.graph.property(blog, "author").expect_object();
    assert_eq!(batch.graph.property(author, "name"), &Value::from("ada"));
}

#[test]
fn discriminated_constructor_argument_reads_prefixed_columns() {
    let catalog = Catalog::builder()
        .descriptor(
            TypeDescriptor::record("Car")
                .property("id", SourceType::I64)
                .property("engine", SourceType::Object)
                .constructor([("id", SourceType::I64), ("engine", SourceType::Object)]),
        )
        .descriptor(TypeDescriptor::record("Engine").property("kind", SourceType::String))
        .descriptor(TypeDescriptor::record("ElectricEngine").property("volts", SourceType::I32))
        .schema(
            MappingSchema::new("electricMap", "ElectricEngine")
                .property(PropertyMapping::column("volts", "volts")),
        )
        .schema(
            MappingSchema::new("engineMap", "Engine")
                .property(PropertyMapping::column("kind", "kind"))
                .discriminator(
                    Discriminator::new("kind", SourceType::String).case("electric", "electricMap"),
                ),
        )
        .schema(
            MappingSchema::new("carMap", "Car")
                .property(PropertyMapping::column("id", "id").constructor())
                .property(
                    PropertyMapping::nested("engine", "engineMap")
                        .prefix("e_")
                        .constructor(),
                ),
        )
        .statement(StatementSpec::new("selectCars").schema("carMap"))
        .build()
        .unwrap();

    let rows = MemoryRows::new([
        ("id", SourceType::I64),
        ("e_kind", SourceType::String),
        ("e_volts", SourceType::I32),
    ])
    .row(values![1_i64, "electric", 400_i32]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectCars"), rows).unwrap();

    let car = batch.rows[0].expect_object();
    let motor = batch.graph.property(car, "engine").expect_object();
    assert_eq!(batch.graph[motor].descriptor().as_str(), "ElectricEngine");
    assert_eq!(batch.graph.property(motor, "volts"), &Value::I32(400));
}

fn positional_catalog(descriptor: TypeDescriptor) -> Catalog {
    Catalog::builder()
        .descriptor(descriptor)
        .schema(MappingSchema::new("userMap", "User"))
        .statement(StatementSpec::new("selectUsers").schema("userMap"))
        .build()
        .unwrap()
}

#[test]
fn sole_constructor_is_taken_as_is() {
    let catalog = positional_catalog(
        TypeDescriptor::record("User")
            .property("id", SourceType::I64)
            .no_default_constructor()
            .constructor([("id", SourceType::I64)]),
    );
    let rows = MemoryRows::new([("id", SourceType::I64)]).row(values![3_i64]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();
    assert_eq!(
        batch.graph.property(batch.rows[0].expect_object(), "id"),
        &Value::I64(3)
    );
}

#[test]
fn positional_matching_picks_the_fitting_arity() {
    let catalog = positional_catalog(
        TypeDescriptor::record("User")
            .property("id", SourceType::I64)
            .property("name", SourceType::String)
            .no_default_constructor()
            .constructor([("name", SourceType::String)])
            .constructor([("id", SourceType::I64), ("name", SourceType::String)]),
    );
    let rows = MemoryRows::new([("id", SourceType::I64), ("name", SourceType::String)])
        .row(values![1_i64, "A"]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();

    let user = batch.rows[0].expect_object();
    assert_eq!(batch.graph.property(user, "id"), &Value::I64(1));
    assert_eq!(batch.graph.property(user, "name"), &Value::from("A"));
}

#[test]
fn preferred_constructor_wins_over_arity() {
    let catalog = positional_catalog(
        TypeDescriptor::record("User")
            .property("id", SourceType::I64)
            .property("name", SourceType::String)
            .no_default_constructor()
            .constructor([
                ("id", SourceType::I64),
                ("name", SourceType::String),
                ("extra", SourceType::String),
            ])
            .preferred_constructor([("name", SourceType::String)]),
    );
    let rows = MemoryRows::new([("name", SourceType::String)]).row(values!["A"]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();

    let user = batch.rows[0].expect_object();
    assert_eq!(batch.graph.property(user, "name"), &Value::from("A"));
}

#[test]
fn no_qualifying_constructor_is_fatal() {
    let catalog = positional_catalog(
        TypeDescriptor::record("User")
            .property("id", SourceType::I64)
            .no_default_constructor()
            .constructor([("id", SourceType::I64), ("name", SourceType::String)])
            .constructor([
                ("id", SourceType::I64),
                ("name", SourceType::String),
                ("extra", SourceType::String),
            ]),
    );
    let rows = MemoryRows::new([("id", SourceType::I64)]).row(values![1_i64]);
    let engine = Engine::new(catalog);
    let err = engine
        .execute(&statement("selectUsers"), rows)
        .unwrap_err();
    assert!(err.is_constructor_mismatch());
}

#[test]
fn positional_matching_requires_convertible_parameters() {
    // Two candidates share the arity; only the second converts from the
    // column types.
    let catalog = positional_catalog(
        TypeDescriptor::record("User")
            .property("id", SourceType::I64)
            .property("flag", SourceType::Bool)
            .no_default_constructor()
            .constructor([("flag", SourceType::Bool), ("id", SourceType::I64)])
            .constructor([("id", SourceType::I64), ("flag", SourceType::Bool)]),
    );
    let rows = MemoryRows::new([("id", SourceType::I64), ("flag", SourceType::Bool)])
        .row(values![5_i64, true]);
    let engine = Engine::new(catalog);
    let batch = engine.execute(&statement("selectUsers"), rows).unwrap();

    let user = batch.rows[0].expect_object();
    assert_eq!(batch.graph.property(user, "id"), &Value::I64(5));
    assert_eq!(batch.graph.property(user, "flag"), &Value::Bool(true));
}
