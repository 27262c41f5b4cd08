//! Shared fixtures: in-memory `.tar.gz` snapshots and a local archive host

#![allow(dead_code)]

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse as _;
use axum::routing::get;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::BTreeSet;
use std::path::Path;
use tar::{EntryType, Header};
use walkdir::WalkDir;

/// One archive member
pub enum Item<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8]),
    /// Symbolic link at the first path pointing to the second
    Symlink(&'a str, &'a str),
    /// `pax_global_header` record as emitted by GitHub archives
    GlobalHeader,
}

/// Build a gzip-compressed tar archive from `items`, in order
pub fn build_archive(items: &[Item<'_>]) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let encoder = GzEncoder::new(&mut bytes, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for item in items {
            let mut header = Header::new_ustar();
            match item {
                Item::Dir(path) => {
                    header.set_entry_type(EntryType::Directory);
                    header.set_mode(0o755);
                    header.set_size(0);
                    header.set_cksum();
                    builder
                        .append_data(&mut header, path, std::io::empty())
                        .unwrap();
                }
                Item::File(path, contents) => {
                    header.set_entry_type(EntryType::Regular);
                    header.set_mode(0o644);
                    header.set_size(contents.len() as u64);
                    header.set_cksum();
                    builder.append_data(&mut header, path, *contents).unwrap();
                }
                Item::Symlink(path, target) => {
                    header.set_entry_type(EntryType::Symlink);
                    header.set_mode(0o777);
                    header.set_size(0);
                    header.set_link_name(target).unwrap();
                    header.set_cksum();
                    builder
                        .append_data(&mut header, path, std::io::empty())
                        .unwrap();
                }
                Item::GlobalHeader => {
                    let record = b"52 comment=2f1c9e0d4b7a8c6e5f3a2b1c0d9e8f7a6b5c4d3e\n";
                    header.set_entry_type(EntryType::XGlobalHeader);
                    header.set_mode(0o666);
                    header.set_size(record.len() as u64);
                    header.set_cksum();
                    builder
                        .append_data(&mut header, "pax_global_header", &record[..])
                        .unwrap();
                }
            }
        }

        builder.into_inner().unwrap().finish().unwrap();
    }
    bytes
}

/// The snapshot most tests serve for `acme/widgets`
pub fn widgets_archive(wrapper: &str) -> Vec<u8> {
    let dir = format!("{wrapper}/");
    let readme = format!("{wrapper}/README.md");
    let lib = format!("{wrapper}/src/lib.rs");
    build_archive(&[
        Item::GlobalHeader,
        Item::Dir(&dir),
        Item::File(&readme, b"# widgets\n"),
        Item::File(&lib, b"pub fn widget() {}\n"),
    ])
}

/// Write archive bytes to `dir/name` and return the path
pub fn write_archive(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Relative paths of every file under `root`, with `/` separators
pub fn list_files(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

/// Archive host that redirects `/{owner}/{repo}/archive/{ref}.tar.gz` to a
/// codeload-style URL, like GitHub does
pub fn archive_host(repository: &str, reference: &str, archive: Vec<u8>) -> Router {
    let archive_path = format!("/{repository}/archive/{reference}.tar.gz");
    let codeload_path = format!("/codeload/{repository}/tar.gz/{reference}");
    let location = codeload_path.clone();

    Router::new()
        .route(
            &archive_path,
            get(move || {
                let location = location.clone();
                async move { (StatusCode::FOUND, [(header::LOCATION, location)]).into_response() }
            }),
        )
        .route(
            &codeload_path,
            get(move || {
                let archive = archive.clone();
                async move { archive }
            }),
        )
}

/// Serve `app` on an ephemeral port of the current runtime
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Serve `app` from a dedicated thread, for tests that are not async
pub fn spawn_server_thread(app: Router) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}
