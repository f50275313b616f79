use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam::channel::Receiver;
use tempfile::TempDir;
use tokio::sync::mpsc;

use super::RebuildActor;
use crate::actor::fs::{ChangeKind, FsEvent};
use crate::config::{BuildConfig, test_site_config};
use crate::registry::SiteState;
use crate::reload::{ReloadHub, ReloadMessage};

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

struct Site {
    _dir: TempDir,
    build: BuildConfig,
    state: Arc<SiteState>,
    hub: Arc<ReloadHub>,
    actor: RebuildActor,
}

impl Site {
    fn new(pages: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let build = test_site_config(dir.path()).build;
        write(&build.source, "layouts/Default.html", "<html><body>__CONTENT__</body></html>");
        write(&build.source, "snippets/Footer.html", "<footer>©</footer>");
        for (rel, content) in pages {
            write(&build.source, rel, content);
        }

        let state = Arc::new(SiteState::new(build.clone()).unwrap());
        let hub = Arc::new(ReloadHub::new());
        let (_tx, rx) = mpsc::channel(1);
        let actor = RebuildActor::new(rx, Arc::clone(&state), Arc::clone(&hub));
        Self {
            _dir: dir,
            build,
            state,
            hub,
            actor,
        }
    }

    fn src(&self, rel: &str) -> PathBuf {
        self.build.source.join(rel)
    }

    fn out(&self, rel: &str) -> PathBuf {
        self.build.output.join(rel)
    }

    fn read_out(&self, rel: &str) -> String {
        fs::read_to_string(self.out(rel)).unwrap()
    }
}

fn event(path: PathBuf, kind: ChangeKind) -> FsEvent {
    FsEvent::new(path, kind)
}

fn drain(rx: &Receiver<ReloadMessage>) -> usize {
    rx.try_iter().count()
}

#[tokio::test]
async fn page_edit_reloads_every_client_once() {
    let site = Site::new(&[("pages/index.md", "# Hi")]);
    let (_a, rx_a) = site.hub.register();
    let (_b, rx_b) = site.hub.register();

    let page = write(&site.build.source, "pages/index.md", "# Hello");
    let report = site.actor.dispatch(event(page, ChangeKind::Modified)).await;

    assert_eq!(report.rendered, 1);
    assert_eq!(site.read_out("index.html"), "<html><body><h1>Hello</h1></body></html>");
    assert_eq!(drain(&rx_a), 1);
    assert_eq!(drain(&rx_b), 1);
}

#[tokio::test]
async fn snippet_change_renders_exactly_referencing_pages() {
    let site = Site::new(&[
        ("pages/a.html", "<p>a</p><Footer></Footer>"),
        ("pages/b.html", "<p>b</p>"),
        ("pages/c.md", "text\n\n<Footer></Footer>"),
    ]);

    let footer = write(&site.build.source, "snippets/Footer.html", "<footer>new</footer>");
    let report = site.actor.dispatch(event(footer, ChangeKind::Modified)).await;

    assert_eq!(report.rendered, 2);
    assert!(report.errors.is_empty());
    assert!(site.read_out("a.html").contains("<footer>new</footer>"));
    assert!(site.read_out("c.html").contains("<footer>new</footer>"));
    assert!(!site.out("b.html").exists());
}

#[tokio::test]
async fn snippet_delete_uses_edges_before_rebuild() {
    let site = Site::new(&[("pages/a.html", "<Footer></Footer>"), ("pages/b.html", "b")]);

    let footer = site.src("snippets/Footer.html");
    fs::remove_file(&footer).unwrap();
    let report = site.actor.dispatch(event(footer.clone(), ChangeKind::Removed)).await;

    assert_eq!(report.rendered, 1);
    assert_eq!(site.read_out("a.html"), "<html><body><Footer></Footer></body></html>");
    assert!(!site.state.snapshot().snippets.contains_key("Footer"));
    assert!(site.state.snapshot().graph.used_by(&footer).is_empty());
}

#[tokio::test]
async fn new_layout_picks_up_declaring_pages() {
    let site = Site::new(&[
        ("pages/post.md", "---\nlayout: Blog\n---\nbody"),
        ("pages/index.md", "# Hi"),
    ]);

    let blog = write(&site.build.source, "layouts/Blog.html", "<article>__CONTENT__</article>");
    let report = site.actor.dispatch(event(blog, ChangeKind::Created)).await;

    assert_eq!(report.rendered, 1);
    assert_eq!(site.read_out("post.html"), "<article><p>body</p></article>");
    assert!(!site.out("index.html").exists());
}

#[tokio::test]
async fn layout_edit_and_delete_render_declaring_page() {
    let site = Site::new(&[
        ("layouts/Blog.html", "<article>__CONTENT__</article>"),
        ("pages/post.md", "---\nlayout: Blog\n---\nbody"),
        ("pages/index.md", "# Hi"),
    ]);

    let blog = write(&site.build.source, "layouts/Blog.html", "<main>__CONTENT__</main>");
    let report = site.actor.dispatch(event(blog.clone(), ChangeKind::Modified)).await;

    assert_eq!(report.rendered, 1);
    assert_eq!(site.read_out("post.html"), "<main><p>body</p></main>");
    assert!(!site.out("index.html").exists());

    fs::remove_file(&blog).unwrap();
    let report = site.actor.dispatch(event(blog.clone(), ChangeKind::Removed)).await;

    assert_eq!(report.rendered, 1);
    assert!(report.errors.is_empty());
    assert_eq!(site.read_out("post.html"), "<html><body><p>body</p></body></html>");
    assert!(!site.out("index.html").exists());
    assert!(!site.state.snapshot().layouts.contains_key("Blog"));
}

#[tokio::test]
async fn page_removed_deletes_destination() {
    let site = Site::new(&[("pages/old.md", "# Old")]);
    let (_c, rx) = site.hub.register();
    let page = site.src("pages/old.md");

    site.actor.dispatch(event(page.clone(), ChangeKind::Modified)).await;
    assert!(site.out("old.html").exists());

    fs::remove_file(&page).unwrap();
    let report = site.actor.dispatch(event(page.clone(), ChangeKind::Removed)).await;

    assert_eq!(report.removed, 1);
    assert!(!site.out("old.html").exists());
    assert!(!site.state.snapshot().graph.contains_page(&page));
    assert_eq!(drain(&rx), 2);
}

#[tokio::test]
async fn asset_created_is_copied_verbatim() {
    let site = Site::new(&[]);
    let css = write(&site.build.source, "css/site.css", "<Footer></Footer>");

    let report = site.actor.dispatch(event(css, ChangeKind::Created)).await;
    assert_eq!(report.written, 1);
    assert_eq!(site.read_out("css/site.css"), "<Footer></Footer>");
}

#[tokio::test]
async fn asset_directory_removed_recursively() {
    let site = Site::new(&[]);
    let img = write(&site.build.source, "img/a.png", "png");
    site.actor.dispatch(event(img, ChangeKind::Created)).await;
    assert!(site.out("img/a.png").exists());

    let dir = site.src("img");
    fs::remove_dir_all(&dir).unwrap();
    let report = site.actor.dispatch(event(dir, ChangeKind::Removed)).await;

    assert_eq!(report.removed, 1);
    assert!(!site.out("img").exists());
}

#[tokio::test]
async fn removed_pages_root_drops_page_outputs_only() {
    let site = Site::new(&[
        ("pages/index.md", "# Hi"),
        ("pages/blog/post.md", "# Post"),
        ("css/site.css", "body {}"),
    ]);
    crate::cli::build::render_site(&site.build, &site.state.snapshot(), true).unwrap();
    assert!(site.out("blog/post.html").exists());

    let pages = site.src("pages");
    fs::remove_dir_all(&pages).unwrap();
    let report = site.actor.dispatch(event(pages, ChangeKind::Removed)).await;

    assert_eq!(report.removed, 2);
    assert!(report.errors.is_empty());
    assert!(!site.out("index.html").exists());
    assert!(!site.out("blog/post.html").exists());
    assert_eq!(site.read_out("css/site.css"), "body {}");
    assert_eq!(site.state.snapshot().graph.page_count(), 0);
}

#[tokio::test]
async fn created_directory_is_mirrored_with_contents() {
    let site = Site::new(&[]);
    write(&site.build.source, "pages/docs/intro.md", "# Intro");
    write(&site.build.source, "pages/docs/empty/.keep", "");

    let report = site
        .actor
        .dispatch(event(site.src("pages/docs"), ChangeKind::Created))
        .await;

    assert_eq!(report.rendered, 2);
    assert!(site.out("docs/empty/.keep").is_file());
    assert_eq!(site.read_out("docs/intro.html"), "<html><body><h1>Intro</h1></body></html>");
    assert!(site.state.snapshot().graph.contains_page(&site.src("pages/docs/intro.md")));
}

#[tokio::test]
async fn directory_modify_is_ignored() {
    let site = Site::new(&[("pages/index.md", "# Hi")]);
    let (_c, rx) = site.hub.register();

    let report = site
        .actor
        .dispatch(event(site.src("pages"), ChangeKind::Modified))
        .await;

    assert!(!report.did_work());
    assert_eq!(drain(&rx), 0);
}

#[tokio::test]
async fn missing_layouts_keeps_previous_snapshot() {
    let site = Site::new(&[("pages/index.md", "# Hi")]);
    let (_c, rx) = site.hub.register();

    let layouts = site.build.layouts_dir();
    fs::remove_dir_all(&layouts).unwrap();
    let report = site
        .actor
        .dispatch(event(layouts.join("Default.html"), ChangeKind::Removed))
        .await;

    assert_eq!(report.errors.len(), 1);
    assert!(!report.did_work());
    assert!(site.state.snapshot().default_layout().is_some());
    assert_eq!(drain(&rx), 0);
}

#[tokio::test]
async fn shutdown_message_stops_run_loop() {
    let site = Site::new(&[]);
    let (tx, rx) = mpsc::channel(4);
    let actor = RebuildActor::new(rx, Arc::clone(&site.state), Arc::clone(&site.hub));
    let handle = tokio::spawn(actor.run());

    tx.send(crate::actor::messages::RebuildMsg::Shutdown).await.unwrap();
    handle.await.unwrap();
}
