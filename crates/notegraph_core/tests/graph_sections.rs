use notegraph_core::db::open_db_in_memory;
use notegraph_core::repo::{graphs_path, PROJECTS};
use notegraph_core::{
    Chapter, ChapterService, DocumentStore, ErrorKind, GraphService, GraphServiceError, Id,
    ProjectService, RawGraphChild, RawSection, SqliteDocumentStore,
};
use serde_json::json;

const USER: &str = "user-1";

struct Fixture {
    project_id: String,
    chapter: Chapter,
}

fn fixture(store: SqliteDocumentStore<'_>) -> Fixture {
    let project_id = ProjectService::new(store)
        .create_project(USER, "Essay", "")
        .unwrap()
        .id
        .into_string();
    let chapter = ChapterService::new(store)
        .create_chapter(&project_id, USER, "Opening", 1)
        .unwrap();
    Fixture {
        project_id,
        chapter,
    }
}

fn graph_collection(fixture: &Fixture) -> String {
    graphs_path(
        &Id::parse("project id", fixture.project_id.as_str()).unwrap(),
        &fixture.chapter.id,
    )
}

#[test]
fn sectionalize_creates_one_graph_per_section() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let fx = fixture(store);
    let graphs = GraphService::new(store);

    let chapter = graphs
        .sectionalize(
            &fx.project_id,
            fx.chapter.id.as_str(),
            USER,
            &[RawSection::new("Claim", "the claim"), RawSection::new("Proof", "")],
        )
        .unwrap();
    assert_eq!(chapter.number.get(), 1);
    let names = chapter
        .sections
        .iter()
        .map(|section| section.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["Claim", "Proof"]);

    let claim = graphs
        .get_graph(
            &fx.project_id,
            fx.chapter.id.as_str(),
            chapter.sections[0].id.as_str(),
            USER,
        )
        .unwrap();
    assert_eq!(claim.id, chapter.sections[0].id);
    assert_eq!(claim.name.as_str(), "Claim");
    assert_eq!(claim.paragraph.as_str(), "the claim");
    assert!(claim.children.is_empty());
}

#[test]
fn sectionalize_again_replaces_sections_and_their_graphs() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let fx = fixture(store);
    let graphs = GraphService::new(store);

    let first = graphs
        .sectionalize(
            &fx.project_id,
            fx.chapter.id.as_str(),
            USER,
            &[RawSection::new("Old", "a"), RawSection::new("Older", "b")],
        )
        .unwrap();
    let second = graphs
        .sectionalize(
            &fx.project_id,
            fx.chapter.id.as_str(),
            USER,
            &[RawSection::new("New", "c")],
        )
        .unwrap();

    assert_eq!(second.sections.len(), 1);
    let stored = store.list(&graph_collection(&fx)).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, second.sections[0].id.as_str());

    let err = graphs
        .get_graph(
            &fx.project_id,
            fx.chapter.id.as_str(),
            first.sections[0].id.as_str(),
            USER,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn invalid_section_list_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let fx = fixture(store);
    let graphs = GraphService::new(store);

    let too_many = (0..21)
        .map(|i| RawSection::new(format!("s{i}"), ""))
        .collect::<Vec<_>>();
    let err = graphs
        .sectionalize(&fx.project_id, fx.chapter.id.as_str(), USER, &too_many)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let GraphServiceError::InvalidSections(errors) = err else {
        panic!("expected section errors");
    };
    assert_eq!(
        errors.message,
        "sections length must be less than or equal to 20, but got 21"
    );
    assert_eq!(errors.items.len(), 21);

    let err = graphs
        .sectionalize(
            &fx.project_id,
            fx.chapter.id.as_str(),
            USER,
            &[RawSection::new("", "ok"), RawSection::new("Fine", "ok")],
        )
        .unwrap_err();
    let GraphServiceError::InvalidSections(errors) = err else {
        panic!("expected section errors");
    };
    assert!(errors.message.is_empty());
    assert_eq!(errors.items[0].name, "name is required, but got ''");
    assert!(errors.items[1].is_empty());

    assert!(store.list(&graph_collection(&fx)).unwrap().is_empty());
}

#[test]
fn update_graph_stores_children_and_renames_section() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let fx = fixture(store);
    let graphs = GraphService::new(store);
    let chapters = ChapterService::new(store);

    let chapter = graphs
        .sectionalize(
            &fx.project_id,
            fx.chapter.id.as_str(),
            USER,
            &[RawSection::new("Draft", "text")],
        )
        .unwrap();
    let graph_id = chapter.sections[0].id.as_str();

    let children = vec![
        RawGraphChild {
            name: "Cause".to_string(),
            relation: "because".to_string(),
            description: "root cause".to_string(),
            children: vec![RawGraphChild::named("Detail", vec![])],
        },
        RawGraphChild::named("Effect", vec![RawGraphChild::named("Detail", vec![])]),
    ];
    let graph = graphs
        .update_graph(
            &fx.project_id,
            fx.chapter.id.as_str(),
            graph_id,
            USER,
            "Final",
            "new text",
            &children,
        )
        .unwrap();
    assert_eq!(graph.name.as_str(), "Final");
    assert_eq!(graph.paragraph.as_str(), "new text");
    assert_eq!(graph.children.len(), 2);
    assert_eq!(graph.children[0].relation.as_str(), "because");
    assert_eq!(graph.children[1].children[0].name.as_str(), "Detail");

    let reloaded = chapters
        .get_chapter(&fx.project_id, fx.chapter.id.as_str(), USER)
        .unwrap();
    assert_eq!(reloaded.sections[0].name.as_str(), "Final");
    assert_eq!(reloaded.sections[0].id.as_str(), graph_id);
}

#[test]
fn update_graph_reports_every_field_error() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let fx = fixture(store);
    let graphs = GraphService::new(store);
    let chapter = graphs
        .sectionalize(
            &fx.project_id,
            fx.chapter.id.as_str(),
            USER,
            &[RawSection::new("Draft", "text")],
        )
        .unwrap();

    let children = vec![
        RawGraphChild::named("Same", vec![]),
        RawGraphChild::named("Same", vec![RawGraphChild::named("", vec![])]),
        RawGraphChild::named("Same", vec![]),
    ];
    let err = graphs
        .update_graph(
            &fx.project_id,
            fx.chapter.id.as_str(),
            chapter.sections[0].id.as_str(),
            USER,
            "",
            &"x".repeat(40_001),
            &children,
        )
        .unwrap_err();
    let GraphServiceError::InvalidFields(fields) = err else {
        panic!("expected field errors");
    };
    assert_eq!(fields.name, "name is required, but got ''");
    assert_eq!(
        fields.paragraph,
        "paragraph must be less than or equal to 40000 bytes, but got 40001 bytes"
    );
    assert_eq!(
        fields.children.message,
        "names of children must be unique, but got 'Same' duplicated"
    );
    assert_eq!(fields.children.items.len(), 3);
    assert_eq!(
        fields.children.items[1].children.items[0].name,
        "name is required, but got ''"
    );

    let stored = graphs
        .get_graph(
            &fx.project_id,
            fx.chapter.id.as_str(),
            chapter.sections[0].id.as_str(),
            USER,
        )
        .unwrap();
    assert_eq!(stored.name.as_str(), "Draft");
}

#[test]
fn delete_graph_keeps_section_summary() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let fx = fixture(store);
    let graphs = GraphService::new(store);
    let chapter = graphs
        .sectionalize(
            &fx.project_id,
            fx.chapter.id.as_str(),
            USER,
            &[RawSection::new("Only", "")],
        )
        .unwrap();
    let graph_id = chapter.sections[0].id.as_str();

    graphs
        .delete_graph(&fx.project_id, fx.chapter.id.as_str(), graph_id, USER)
        .unwrap();

    let err = graphs
        .get_graph(&fx.project_id, fx.chapter.id.as_str(), graph_id, USER)
        .unwrap_err();
    assert_eq!(err.to_string(), format!("graph not found: {graph_id}"));
    let err = graphs
        .delete_graph(&fx.project_id, fx.chapter.id.as_str(), graph_id, USER)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let reloaded = ChapterService::new(store)
        .get_chapter(&fx.project_id, fx.chapter.id.as_str(), USER)
        .unwrap();
    assert_eq!(reloaded.sections.len(), 1);
}

#[test]
fn persisted_tree_with_duplicate_siblings_is_a_read_failure() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let fx = fixture(store);
    let graphs = GraphService::new(store);

    store
        .create(
            &graph_collection(&fx),
            "corrupt",
            &json!({
                "name": "Corrupt",
                "paragraph": "",
                "children": [{"name": "Twin"}, {"name": "Twin"}]
            }),
        )
        .unwrap();

    let err = graphs
        .get_graph(&fx.project_id, fx.chapter.id.as_str(), "corrupt", USER)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadFailure);
}

#[test]
fn graphs_of_foreign_projects_are_hidden() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let fx = fixture(store);

    let err = GraphService::new(store)
        .sectionalize(
            &fx.project_id,
            fx.chapter.id.as_str(),
            "intruder",
            &[RawSection::new("Mine", "")],
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(store.get(PROJECTS, &fx.project_id).is_ok());
}
