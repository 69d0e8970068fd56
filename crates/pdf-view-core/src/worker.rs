use crate::cache::{PageCache, page_key};
use crate::renderer::Renderer;
use pdf_view_runtime::{DocumentId, DocumentSource, RequestId, ViewerCommand, ViewerUpdate};
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc;

/// Documents and rendered pages owned by the worker
struct WorkerState {
    documents: HashMap<DocumentId, DocumentSource>,
    cache: PageCache,
    next_doc_id: u64,
}

impl WorkerState {
    fn new(cache_pages: usize) -> Self {
        Self {
            documents: HashMap::new(),
            cache: PageCache::new(cache_pages),
            next_doc_id: 0,
        }
    }

    fn next_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_doc_id);
        self.next_doc_id += 1;
        id
    }
}

/// Async worker task that processes viewer commands and sends updates.
///
/// Runs until every command sender has been dropped.
pub async fn worker_task<R: Renderer>(
    renderer: R,
    cache_pages: usize,
    mut command_rx: mpsc::UnboundedReceiver<ViewerCommand>,
    update_tx: mpsc::UnboundedSender<ViewerUpdate>,
) {
    let mut state = WorkerState::new(cache_pages);
    let mut deferred = VecDeque::new();

    loop {
        let cmd = match deferred.pop_front() {
            Some(cmd) => cmd,
            None => match command_rx.recv().await {
                Some(cmd) => cmd,
                None => break,
            },
        };
        process_command(
            cmd,
            &renderer,
            &mut state,
            &mut command_rx,
            &mut deferred,
            &update_tx,
        )
        .await;
    }

    log::debug!("Render worker stopped");
}

/// Next command already waiting, without blocking
fn take_queued(
    command_rx: &mut mpsc::UnboundedReceiver<ViewerCommand>,
    deferred: &mut VecDeque<ViewerCommand>,
) -> Option<ViewerCommand> {
    deferred.pop_front().or_else(|| command_rx.try_recv().ok())
}

async fn process_command<R: Renderer>(
    cmd: ViewerCommand,
    renderer: &R,
    state: &mut WorkerState,
    command_rx: &mut mpsc::UnboundedReceiver<ViewerCommand>,
    deferred: &mut VecDeque<ViewerCommand>,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    match cmd {
        ViewerCommand::Load { request, source } => {
            handle_load(request, source, renderer, state, update_tx).await;
        }
        ViewerCommand::RenderPage {
            mut request,
            mut doc_id,
            mut page_index,
            mut scale,
        } => {
            // Deduplicate render commands - keep the most recent one
            while let Some(next_cmd) = take_queued(command_rx, deferred) {
                match next_cmd {
                    ViewerCommand::RenderPage {
                        request: new_request,
                        doc_id: new_doc_id,
                        page_index: new_page_index,
                        scale: new_scale,
                    } => {
                        log::debug!(
                            "Discarding queued render {:?}, using newer {:?}",
                            request,
                            new_request
                        );
                        request = new_request;
                        doc_id = new_doc_id;
                        page_index = new_page_index;
                        scale = new_scale;
                    }
                    ViewerCommand::PrefetchPages { .. } => {
                        log::debug!("Discarding prefetch during page navigation");
                    }
                    other => {
                        // Keep ordering: everything after this runs after the render
                        deferred.push_front(other);
                        break;
                    }
                }
            }

            handle_render_page(
                request, doc_id, page_index, scale, renderer, state, update_tx,
            )
            .await;
        }
        ViewerCommand::PrefetchPages {
            doc_id,
            page_indices,
            scale,
        } => {
            handle_prefetch_pages(doc_id, page_indices, scale, renderer, state, command_rx, deferred)
                .await;
        }
        ViewerCommand::Close { doc_id } => {
            state.documents.remove(&doc_id);
            state.cache.remove_document(doc_id);
            let _ = update_tx.send(ViewerUpdate::Closed { doc_id });
        }
    }
}

async fn handle_load<R: Renderer>(
    request: RequestId,
    source: DocumentSource,
    renderer: &R,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    match renderer.decode(&source).await {
        Ok(page_sizes) if page_sizes.is_empty() => {
            let _ = update_tx.send(ViewerUpdate::LoadFailed {
                request,
                message: "Document has no pages".to_string(),
            });
        }
        Ok(page_sizes) => {
            let doc_id = state.next_id();
            log::debug!(
                "Loaded {} as {:?} with {} pages",
                source,
                doc_id,
                page_sizes.len()
            );
            state.documents.insert(doc_id, source);
            let _ = update_tx.send(ViewerUpdate::Loaded {
                request,
                doc_id,
                page_sizes,
            });
        }
        Err(e) => {
            let _ = update_tx.send(ViewerUpdate::LoadFailed {
                request,
                message: e.to_string(),
            });
        }
    }
}

async fn handle_render_page<R: Renderer>(
    request: RequestId,
    doc_id: DocumentId,
    page_index: usize,
    scale: f32,
    renderer: &R,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    let cache_key = page_key(doc_id, page_index, scale);

    // Check cache first
    if let Some(cached) = state.cache.get(&cache_key) {
        let _ = update_tx.send(ViewerUpdate::PageRendered {
            request,
            doc_id,
            page_index,
            scale,
            surface: cached.clone(),
        });
        return;
    }

    let Some(source) = state.documents.get(&doc_id) else {
        let _ = update_tx.send(ViewerUpdate::RenderFailed {
            request,
            doc_id,
            page_index,
            message: format!("Document not found: {:?}", doc_id),
        });
        return;
    };

    match renderer.rasterize(source, page_index, scale).await {
        Ok(surface) if surface.is_consistent() => {
            state.cache.insert(cache_key, surface.clone());
            let _ = update_tx.send(ViewerUpdate::PageRendered {
                request,
                doc_id,
                page_index,
                scale,
                surface,
            });
        }
        Ok(surface) => {
            let _ = update_tx.send(ViewerUpdate::RenderFailed {
                request,
                doc_id,
                page_index,
                message: format!(
                    "Renderer returned {} bytes for a {}x{} page",
                    surface.rgba_data.len(),
                    surface.width,
                    surface.height
                ),
            });
        }
        Err(e) => {
            let _ = update_tx.send(ViewerUpdate::RenderFailed {
                request,
                doc_id,
                page_index,
                message: e.to_string(),
            });
        }
    }
}

/// Prefetch pages into cache without sending updates.
/// Stops as soon as another command is waiting.
async fn handle_prefetch_pages<R: Renderer>(
    doc_id: DocumentId,
    page_indices: Vec<usize>,
    scale: f32,
    renderer: &R,
    state: &mut WorkerState,
    command_rx: &mut mpsc::UnboundedReceiver<ViewerCommand>,
    deferred: &VecDeque<ViewerCommand>,
) {
    for page_index in page_indices {
        if !deferred.is_empty() || !command_rx.is_empty() {
            log::debug!("Stopping prefetch, newer commands are waiting");
            return;
        }

        let cache_key = page_key(doc_id, page_index, scale);
        if state.cache.contains(&cache_key) {
            continue;
        }

        let Some(source) = state.documents.get(&doc_id) else {
            return;
        };

        match renderer.rasterize(source, page_index, scale).await {
            Ok(surface) if surface.is_consistent() => {
                state.cache.insert(cache_key, surface);
                log::debug!("Prefetched page {} into cache", page_index);
            }
            Ok(_) => {
                log::warn!("Discarding malformed prefetch of page {}", page_index);
            }
            Err(e) => {
                log::warn!("Failed to prefetch page {}: {}", page_index, e);
            }
        }
    }
}
