//! Language server host: the format and merge command over `workspace/executeCommand`, format
//! on save and on request over `textDocument/formatting`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, info, warn};
use tower_lsp::jsonrpc::{Error as RpcError, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use crate::{
    adapter::{COMMAND_ID, CommandAdapter, ProviderAdapter},
    config::Config,
    css::LightningCss,
    host::{self, CSS_LANGUAGE_ID, CancellationToken, DocumentSnapshot, Editor, Severity},
    registry::{Registry, Subscriptions},
    service::Formatter,
};

#[derive(Debug, Clone)]
struct OpenDocument {
    text: String,
    version: i32,
    language_id: String,
}

fn file_label(uri: &Url) -> String {
    uri.to_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| uri.to_string())
}

fn to_lsp_position(pos: host::Position) -> Position {
    Position::new(pos.line, pos.character)
}

fn to_lsp_edit(edit: host::TextEdit) -> TextEdit {
    TextEdit {
        range: Range::new(
            to_lsp_position(edit.range.start),
            to_lsp_position(edit.range.end),
        ),
        new_text: edit.new_text,
    }
}

/// Cancelled once the document was closed or changed after the snapshot was taken.
struct VersionGuard<'a> {
    documents: &'a DashMap<Url, OpenDocument>,
    uri: &'a Url,
    version: i32,
}

impl CancellationToken for VersionGuard<'_> {
    fn is_cancelled(&self) -> bool {
        self.documents
            .get(self.uri)
            .map(|doc| doc.version != self.version)
            .unwrap_or(true)
    }
}

pub struct Backend {
    client: Client,
    documents: DashMap<Url, OpenDocument>,
    /// Last document opened, edited or saved
    active: Mutex<Option<Url>>,
    registry: Arc<Registry>,
    subscriptions: Mutex<Subscriptions>,
    command: CommandAdapter,
    provider: ProviderAdapter,
}

impl Backend {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            active: Mutex::new(None),
            registry: Registry::new(),
            subscriptions: Mutex::new(Subscriptions::new()),
            command: CommandAdapter::new(Formatter::new(LightningCss)),
            provider: ProviderAdapter::new(Formatter::new(LightningCss))
                .with_overrides(config.formatting.overrides.clone()),
        }
    }

    /// Registers the command and the CSS formatter. Both are released on shutdown.
    fn activate(&self) {
        let mut subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscriptions.push(self.registry.register_command(COMMAND_ID));
        subscriptions.push(self.registry.register_formatter(CSS_LANGUAGE_ID));
    }

    fn deactivate(&self) {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dispose_all();
    }

    fn set_active(&self, uri: Option<Url>) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = uri;
    }

    fn active(&self) -> Option<Url> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn snapshot(&self, uri: &Url) -> Option<(DocumentSnapshot, i32)> {
        self.documents.get(uri).map(|doc| {
            (
                DocumentSnapshot::new(doc.text.clone(), file_label(uri), doc.language_id.clone()),
                doc.version,
            )
        })
    }
}

/// The command's view of the client: the active document is the one the user last touched.
struct ClientEditor<'a> {
    backend: &'a Backend,
    target: Mutex<Option<Url>>,
}

#[async_trait]
impl Editor for ClientEditor<'_> {
    async fn active_document(&self) -> Option<DocumentSnapshot> {
        let uri = self.backend.active()?;
        let (snapshot, _) = self.backend.snapshot(&uri)?;
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = Some(uri);
        Some(snapshot)
    }

    async fn apply_edit(
        &self,
        document: &DocumentSnapshot,
        edit: host::TextEdit,
    ) -> std::result::Result<(), String> {
        let uri = self
            .target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| format!("{} is no longer open", document.file_label))?;
        let changes = HashMap::from([(uri, vec![to_lsp_edit(edit)])]);
        let response = self
            .backend
            .client
            .apply_edit(WorkspaceEdit {
                changes: Some(changes),
                ..WorkspaceEdit::default()
            })
            .await
            .map_err(|e| e.to_string())?;
        if response.applied {
            Ok(())
        } else {
            Err(response
                .failure_reason
                .unwrap_or_else(|| "rejected by the editor".into()))
        }
    }

    async fn show_message(&self, severity: Severity, message: String) {
        let kind = match severity {
            Severity::Info => MessageType::INFO,
            Severity::Warning => MessageType::WARNING,
            Severity::Error => MessageType::ERROR,
        };
        self.backend.client.show_message(kind, message).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        self.activate();
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                document_formatting_provider: Some(OneOf::Left(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: self.registry.commands(),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("lightningfmt initialized");
        self.client
            .log_message(MessageType::INFO, "Lightning CSS formatter is now active")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.deactivate();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        debug!("opened {} ({})", doc.uri, doc.language_id);
        self.documents.insert(
            doc.uri.clone(),
            OpenDocument {
                text: doc.text,
                version: doc.version,
                language_id: doc.language_id,
            },
        );
        self.set_active(Some(doc.uri));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(mut doc) = self.documents.get_mut(&uri) {
            // Full sync: the last change holds the whole text
            if let Some(change) = params.content_changes.into_iter().last() {
                doc.text = change.text;
            }
            doc.version = params.text_document.version;
        }
        self.set_active(Some(uri));
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        self.set_active(Some(params.text_document.uri));
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        if self.active().as_ref() == Some(&uri) {
            self.set_active(None);
        }
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<LSPAny>> {
        if !self.registry.has_command(&params.command) {
            return Err(RpcError::invalid_params(format!(
                "Unknown command: {}",
                params.command
            )));
        }
        let editor = ClientEditor {
            backend: self,
            target: Mutex::new(None),
        };
        self.command.run(&editor).await;
        Ok(None)
    }

    /// Tab size and indentation options are ignored, Lightning CSS decides the output style.
    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        let Some((snapshot, version)) = self.snapshot(&uri) else {
            warn!("formatting requested for unknown document {uri}");
            return Ok(None);
        };
        if !self.registry.formats(&snapshot.language_id) {
            return Ok(None);
        }
        let guard = VersionGuard {
            documents: &self.documents,
            uri: &uri,
            version,
        };
        Ok(self
            .provider
            .provide_edits(&snapshot, &guard)
            .map(|edits| edits.into_iter().map(to_lsp_edit).collect()))
    }
}

/// Serves the language server over stdin and stdout until the client exits.
pub async fn serve(config: Config) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(|client| Backend::new(client, &config));
    Server::new(stdin, stdout, socket).serve(service).await;
}

#[cfg(test)]
mod tests {
    use dashmap::DashMap;
    use pretty_assertions::assert_eq;
    use tower_lsp::lsp_types::*;
    use tower_lsp::{LanguageServer, LspService};

    use super::{Backend, OpenDocument, VersionGuard, to_lsp_edit};
    use crate::config::Config;
    use crate::host::{CancellationToken, DocumentSnapshot};

    fn document(version: i32) -> OpenDocument {
        OpenDocument {
            text: "a{}".into(),
            version,
            language_id: "css".into(),
        }
    }

    #[test]
    fn guard_cancels_on_new_version_or_close() {
        let uri = Url::parse("file:///tmp/style.css").unwrap();
        let documents = DashMap::new();
        documents.insert(uri.clone(), document(3));
        let guard = VersionGuard {
            documents: &documents,
            uri: &uri,
            version: 3,
        };
        assert!(!guard.is_cancelled());

        documents.insert(uri.clone(), document(4));
        assert!(guard.is_cancelled());

        documents.remove(&uri);
        assert!(guard.is_cancelled());
    }

    #[test]
    fn edit_spans_whole_document() {
        let snapshot = DocumentSnapshot::new("a {\n  color: red\n}", "style.css", "css");
        let edit = to_lsp_edit(snapshot.replace_all("a {\n  color: red;\n}\n".into()));
        assert_eq!(edit.range.start, Position::new(0, 0));
        assert_eq!(edit.range.end, Position::new(2, 1));
        assert_eq!(edit.new_text, "a {\n  color: red;\n}\n");
    }

    async fn open(backend: &Backend, path: &str, language_id: &str) -> Url {
        let uri = Url::parse(path).unwrap();
        backend
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem::new(
                    uri.clone(),
                    language_id.into(),
                    1,
                    "a{color:red;color:red}".into(),
                ),
            })
            .await;
        uri
    }

    async fn format(backend: &Backend, uri: &Url) -> Option<Vec<TextEdit>> {
        backend
            .formatting(DocumentFormattingParams {
                text_document: TextDocumentIdentifier::new(uri.clone()),
                options: FormattingOptions {
                    tab_size: 8,
                    insert_spaces: false,
                    ..FormattingOptions::default()
                },
                work_done_progress_params: WorkDoneProgressParams::default(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn formats_only_registered_languages_while_active() {
        let (service, _socket) = LspService::new(|client| Backend::new(client, &Config::default()));
        let backend = service.inner();
        let style = open(backend, "file:///tmp/style.css", "css").await;
        let theme = open(backend, "file:///tmp/theme.scss", "scss").await;

        assert_eq!(format(backend, &style).await, None);

        backend
            .initialize(InitializeParams::default())
            .await
            .unwrap();
        let edits = format(backend, &style).await.unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range.end, Position::new(0, 22));
        assert_eq!(edits[0].new_text, "a {\n  color: red;\n}\n");
        assert_eq!(format(backend, &theme).await, None);

        backend.shutdown().await.unwrap();
        assert_eq!(format(backend, &style).await, None);
    }
}
