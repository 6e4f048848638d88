//! Tests for the menu orchestrator

use std::io;
use std::sync::Arc;

use navtree::application::services::{MenuEvent, MenuService};
use navtree::application::ApplicationError;
use navtree::config::Settings;
use navtree::domain::{
    Diagnostic, DomainError, DuplicatePolicy, FlatNode, Forest, LinkTarget, NodePatch, TreeNode,
};
use navtree::infrastructure::di::ServiceContainer;
use navtree::infrastructure::traits::{JsonFileStore, MemoryStore, MenuStore};
use navtree::util::testing;
use rstest::{fixture, rstest};
use tempfile::TempDir;

/// Store that serves records but refuses every publish.
struct ReadOnlyStore(Vec<FlatNode>);

impl MenuStore for ReadOnlyStore {
    fn load(&self) -> io::Result<Vec<FlatNode>> {
        Ok(self.0.clone())
    }

    fn publish(&self, _nodes: &[FlatNode]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}

fn records() -> Vec<FlatNode> {
    vec![
        FlatNode::new("home", "Home", 5),
        FlatNode::new("docs", "Docs", 7),
        FlatNode::new("guide", "Guide", 1).with_parent("docs"),
        FlatNode::new("api", "API", 2).with_parent("docs"),
    ]
}

#[fixture]
fn store() -> Arc<MemoryStore> {
    testing::init_test_setup();
    Arc::new(MemoryStore::new(records()))
}

fn loaded(store: &Arc<MemoryStore>) -> MenuService {
    let mut service = MenuService::new(store.clone(), &Settings::default());
    service.load().unwrap();
    service
}

#[rstest]
fn given_store_when_loading_then_normalizes_without_publishing(store: Arc<MemoryStore>) {
    // Act
    let service = loaded(&store);

    // Assert
    assert_eq!(store.publish_count(), 0);
    assert_eq!(service.forest().ids(), vec!["home", "docs", "guide", "api"]);
    let weights: Vec<i64> = service.flat().iter().map(|n| n.order_key).collect();
    assert_eq!(weights, vec![10, 20, 10, 20]);
    assert!(service.diagnostics().is_empty());
}

#[rstest]
fn given_add_event_when_dispatching_then_publishes_once(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);

    // Act
    service
        .dispatch(MenuEvent::Add {
            label: "Types".to_string(),
            link: LinkTarget::Content("types".to_string()),
            parent: Some("api".to_string()),
        })
        .unwrap();

    // Assert
    assert_eq!(store.publish_count(), 1);
    assert_eq!(store.nodes(), service.flat());
    let added = service.flat().iter().find(|n| n.id == "types").unwrap();
    assert_eq!(added.parent_id.as_deref(), Some("api"));
    assert_eq!(added.order_key, 10);
}

#[rstest]
fn given_external_link_when_adding_then_generates_external_id(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);

    // Act
    let id = service
        .add_node("Rust", LinkTarget::External("https://rust-lang.org".to_string()), None)
        .unwrap();

    // Assert
    let (hash, millis) = id.strip_prefix("ext-").unwrap().split_once('-').unwrap();
    assert_eq!(hash.len(), 8);
    assert!(millis.parse::<i64>().is_ok(), "unexpected id {}", id);
    let last = service.flat().last().unwrap();
    assert_eq!(last.id, id);
    assert_eq!(last.external_url.as_deref(), Some("https://rust-lang.org"));
    assert_eq!(last.order_key, 30);
}

#[rstest]
fn given_same_url_added_repeatedly_when_adding_then_ids_stay_distinct(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);
    let link = LinkTarget::External("https://x.org".to_string());

    // Act
    let ids: Vec<String> = (0..50)
        .map(|_| service.add_node("Docs", link.clone(), None).unwrap())
        .collect();

    // Assert
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(service.forest().len(), 2 + ids.len());
    assert_eq!(service.forest().first_duplicate_id(), None);
}

#[rstest]
fn given_existing_content_id_when_adding_then_duplicate_rejected(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);

    // Act
    let result = service.add_node("Again", LinkTarget::Content("guide".to_string()), None);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::DuplicateIdentifier(_)))
    ));
    assert_eq!(store.publish_count(), 0);
}

#[rstest]
fn given_edit_event_when_dispatching_then_label_changes(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);

    // Act
    service
        .dispatch(MenuEvent::Edit {
            id: "guide".to_string(),
            patch: NodePatch::default().label("User Guide"),
        })
        .unwrap();

    // Assert
    let guide = store.nodes().into_iter().find(|n| n.id == "guide").unwrap();
    assert_eq!(guide.label, "User Guide");
}

#[rstest]
fn given_remove_event_when_dispatching_then_subtree_unpublished(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);

    // Act
    service
        .dispatch(MenuEvent::Remove {
            id: "docs".to_string(),
        })
        .unwrap();

    // Assert
    assert_eq!(store.nodes(), vec![FlatNode::new("home", "Home", 10)]);
}

#[rstest]
fn given_move_event_when_dispatching_then_renumbers_both_groups(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);

    // Act
    service
        .dispatch(MenuEvent::Move {
            id: "api".to_string(),
            parent: None,
            position: Some(0),
        })
        .unwrap();

    // Assert
    assert_eq!(
        store.nodes(),
        vec![
            FlatNode::new("api", "API", 10),
            FlatNode::new("home", "Home", 20),
            FlatNode::new("docs", "Docs", 30),
            FlatNode::new("guide", "Guide", 10).with_parent("docs"),
        ]
    );
}

#[rstest]
fn given_rearrange_event_when_dispatching_then_publishes_arrangement(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);
    let arrangement = Forest::new(vec![TreeNode::content("docs", "Docs")
        .with_children(vec![TreeNode::content("home", "Home")])]);

    // Act
    service.dispatch(MenuEvent::Rearrange(arrangement.clone())).unwrap();

    // Assert
    assert_eq!(service.forest(), &arrangement);
    assert_eq!(store.nodes().len(), 2);
}

#[rstest]
fn given_unknown_id_when_editing_then_error_and_nothing_published(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);
    let before = service.snapshot().clone();

    // Act
    let result = service.remove_node("ghost");

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::IdNotFound(_)))
    ));
    assert_eq!(service.snapshot(), &before);
    assert_eq!(store.publish_count(), 0);
}

#[rstest]
fn given_duplicate_arrangement_when_rearranging_then_rejected(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);
    let arrangement = Forest::new(vec![
        TreeNode::content("home", "Home"),
        TreeNode::content("home", "Again"),
    ]);

    // Act
    let result = service.rearrange(arrangement);

    // Assert
    assert_eq!(
        result.unwrap_err().as_domain(),
        Some(&DomainError::DuplicateIdentifier("home".to_string()))
    );
    assert_eq!(service.forest().len(), 2);
}

#[rstest]
fn given_failing_publish_when_editing_then_snapshot_unchanged() {
    // Arrange
    let store = Arc::new(ReadOnlyStore(records()));
    let mut service = MenuService::new(store, &Settings::default());
    service.load().unwrap();
    let before = service.snapshot().clone();

    // Act
    let result = service.remove_node("home");

    // Assert
    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
    assert_eq!(service.snapshot(), &before);
}

#[rstest]
fn given_reload_with_repairs_when_dispatching_then_diagnostics_kept(store: Arc<MemoryStore>) {
    // Arrange
    let mut service = loaded(&store);
    let flat = vec![
        FlatNode::new("a", "A", 10).with_parent("missing"),
        FlatNode::new("a", "A again", 20),
    ];

    // Act
    service.dispatch(MenuEvent::Reload(flat)).unwrap();

    // Assert
    assert_eq!(service.forest().ids(), vec!["a"]);
    assert_eq!(service.diagnostics().len(), 2);
    assert!(service
        .diagnostics()
        .contains(&Diagnostic::DuplicateIdentifier { id: "a".to_string() }));
    assert_eq!(store.publish_count(), 0);
}

#[rstest]
fn given_reject_policy_when_loading_duplicates_then_fails() {
    // Arrange
    let store = Arc::new(MemoryStore::new(vec![
        FlatNode::new("a", "A", 10),
        FlatNode::new("a", "B", 20),
    ]));
    let settings = Settings {
        duplicate_policy: DuplicatePolicy::Reject,
        ..Settings::default()
    };
    let mut service = MenuService::new(store, &settings);

    // Act
    let result = service.load();

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::DuplicateIdentifier(_)))
    ));
    assert!(service.forest().is_empty());
}

#[rstest]
fn given_custom_step_when_publishing_then_uses_step(store: Arc<MemoryStore>) {
    // Arrange
    let settings = Settings {
        order_step: 100,
        ..Settings::default()
    };
    let mut service = MenuService::new(store.clone(), &settings);
    service.load().unwrap();

    // Act
    service.edit_node("home", NodePatch::default().label("Start")).unwrap();

    // Assert
    let weights: Vec<i64> = store.nodes().iter().map(|n| n.order_key).collect();
    assert_eq!(weights, vec![100, 200, 100, 200]);
}

#[rstest]
fn given_json_file_when_editing_through_container_then_file_rewritten() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("menu.json");
    JsonFileStore::new(&path).publish(&records()).unwrap();
    let settings = Settings {
        menu_file: path.clone(),
        ..Settings::default()
    };
    let container = ServiceContainer::new(settings);
    let mut service = container.menu_service().unwrap();

    // Act
    service
        .add_node("Blog", LinkTarget::Content("blog".to_string()), None)
        .unwrap();

    // Assert
    let reloaded = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(reloaded, service.flat());
    assert_eq!(reloaded.last(), Some(&FlatNode::new("blog", "Blog", 30)));
}
