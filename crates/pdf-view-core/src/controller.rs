//! View state controller
//!
//! Owns the page/zoom state of the document on screen and turns user actions
//! into render requests for the worker. The controller itself never blocks:
//! requests go out over the command channel and results come back through
//! [`ViewController::apply`]. Every request carries a [`RequestId`]; only the
//! newest outstanding one may change what is displayed.

use crate::document::DocumentView;
use crate::keymap::{KeyPress, ViewAction, WheelInput};
use crate::options::ViewerOptions;
use crate::types::*;
use pdf_view_runtime::{
    DocumentId, DocumentSource, PageSurface, RequestId, ViewerCommand, ViewerUpdate,
};
use tokio::sync::{mpsc, watch};

/// The surface currently on screen and what it was rendered for
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedPage {
    /// 1-indexed
    pub page: usize,
    pub scale: f32,
    pub surface: PageSurface,
}

pub struct ViewController {
    options: ViewerOptions,
    command_tx: mpsc::UnboundedSender<ViewerCommand>,
    snapshot_tx: watch::Sender<ViewSnapshot>,

    phase: Phase,
    source: Option<DocumentSource>,
    doc_id: Option<DocumentId>,
    view: Option<DocumentView>,

    next_request: u64,
    pending_load: Option<RequestId>,
    pending_render: Option<RequestId>,

    displayed: Option<DisplayedPage>,
    render_fault: Option<ViewFault>,
    fullscreen: bool,
    viewport_width: Option<f32>,
}

impl ViewController {
    /// Fails with [`ViewerError::Config`] when `options` do not validate
    pub fn new(
        options: ViewerOptions,
        command_tx: mpsc::UnboundedSender<ViewerCommand>,
    ) -> Result<Self> {
        options.validate()?;
        let (snapshot_tx, _) = watch::channel(ViewSnapshot::default());
        Ok(Self {
            options,
            command_tx,
            snapshot_tx,
            phase: Phase::Idle,
            source: None,
            doc_id: None,
            view: None,
            next_request: 0,
            pending_load: None,
            pending_render: None,
            displayed: None,
            render_fault: None,
            fullscreen: false,
            viewport_width: None,
        })
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Receive a snapshot after every committed change
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            phase: self.phase.clone(),
            current_page: self.view.as_ref().map_or(0, DocumentView::current_page),
            total_pages: self.view.as_ref().map_or(0, DocumentView::total_pages),
            scale: self
                .view
                .as_ref()
                .map_or(self.options.initial_scale, DocumentView::scale),
            fullscreen: self.fullscreen,
            rendering: self.pending_render.is_some(),
            fault: self.render_fault.clone(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn view(&self) -> Option<&DocumentView> {
        self.view.as_ref()
    }

    pub fn current_page(&self) -> Option<usize> {
        self.view.as_ref().map(DocumentView::current_page)
    }

    pub fn total_pages(&self) -> Option<usize> {
        self.view.as_ref().map(DocumentView::total_pages)
    }

    pub fn scale(&self) -> Option<f32> {
        self.view.as_ref().map(DocumentView::scale)
    }

    pub fn displayed(&self) -> Option<&DisplayedPage> {
        self.displayed.as_ref()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// A load or render request is still outstanding
    pub fn is_busy(&self) -> bool {
        self.pending_load.is_some() || self.pending_render.is_some()
    }

    fn notify(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start loading a document. Page 1 is rendered once it has been decoded.
    pub fn load(&mut self, source: DocumentSource) {
        self.release_document();

        let request = self.next_request_id();
        self.pending_load = Some(request);
        self.source = Some(source.clone());
        self.phase = Phase::Loading;

        if self
            .command_tx
            .send(ViewerCommand::Load { request, source })
            .is_err()
        {
            self.pending_load = None;
            self.phase = Phase::Failed(ViewFault::Load(ViewerError::WorkerGone.to_string()));
        }
        self.notify();
    }

    /// Leave the failed state. Returns the source that failed so the caller can retry.
    pub fn reload(&mut self) -> Option<DocumentSource> {
        if !matches!(self.phase, Phase::Failed(_)) {
            return None;
        }
        self.phase = Phase::Idle;
        let source = self.source.take();
        self.notify();
        source
    }

    /// Tear down the view and release the document in the worker
    pub fn close(&mut self) {
        self.release_document();
        self.source = None;
        self.phase = Phase::Idle;
        self.notify();
    }

    fn release_document(&mut self) {
        if let Some(doc_id) = self.doc_id.take() {
            let _ = self.command_tx.send(ViewerCommand::Close { doc_id });
        }
        self.view = None;
        self.pending_load = None;
        self.pending_render = None;
        self.displayed = None;
        self.render_fault = None;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Show `page`. Out-of-range pages and the current page are ignored.
    pub fn go_to(&mut self, page: usize) -> bool {
        let changed = self.view.as_mut().is_some_and(|view| view.go_to(page));
        if changed {
            self.render();
        }
        changed
    }

    /// Page number typed into a text field; anything unparseable is ignored
    pub fn go_to_input(&mut self, text: &str) -> bool {
        match text.trim().parse::<usize>() {
            Ok(page) => self.go_to(page),
            Err(_) => false,
        }
    }

    pub fn next(&mut self) -> bool {
        match self.current_page() {
            Some(page) => self.go_to(page + 1),
            None => false,
        }
    }

    pub fn prev(&mut self) -> bool {
        match self.current_page() {
            Some(page) if page > 1 => self.go_to(page - 1),
            _ => false,
        }
    }

    pub fn first(&mut self) -> bool {
        self.go_to(1)
    }

    pub fn last(&mut self) -> bool {
        match self.total_pages() {
            Some(total) => self.go_to(total),
            None => false,
        }
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    pub fn zoom_in(&mut self) -> bool {
        let step = self.options.zoom_step;
        self.change_scale(|view| view.zoom_by(step))
    }

    pub fn zoom_out(&mut self) -> bool {
        let step = self.options.zoom_step;
        self.change_scale(|view| view.zoom_by(1.0 / step))
    }

    pub fn set_scale(&mut self, scale: f32) -> bool {
        self.change_scale(|view| view.set_scale(scale))
    }

    /// Scale the current page to fill `container_width` pixels
    pub fn fit_to_width(&mut self, container_width: f32) -> bool {
        self.change_scale(|view| match view.fit_width_scale(container_width) {
            Some(scale) => view.set_scale(scale),
            None => false,
        })
    }

    /// Width of the area the page is shown in, used by the fit-to-width shortcut
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = (width > 0.0 && width.is_finite()).then_some(width);
    }

    fn change_scale(&mut self, apply: impl FnOnce(&mut DocumentView) -> bool) -> bool {
        let changed = self.view.as_mut().is_some_and(apply);
        if changed {
            self.render();
        }
        changed
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.notify();
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn handle_action(&mut self, action: ViewAction) -> bool {
        match action {
            ViewAction::PreviousPage => self.prev(),
            ViewAction::NextPage => self.next(),
            ViewAction::FirstPage => self.first(),
            ViewAction::LastPage => self.last(),
            ViewAction::ZoomIn => self.zoom_in(),
            ViewAction::ZoomOut => self.zoom_out(),
            ViewAction::FitToWidth => match self.viewport_width {
                Some(width) => self.fit_to_width(width),
                None => false,
            },
            ViewAction::ToggleFullscreen => {
                self.toggle_fullscreen();
                true
            }
        }
    }

    /// Returns whether the key was bound and changed something
    pub fn handle_key(&mut self, key: KeyPress) -> bool {
        key.action().is_some_and(|action| self.handle_action(action))
    }

    pub fn handle_wheel(&mut self, wheel: WheelInput) -> bool {
        wheel.action().is_some_and(|action| self.handle_action(action))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Ask the worker for the current page at the current scale.
    ///
    /// Supersedes any render still in flight.
    pub fn render(&mut self) {
        let (Some(view), Some(doc_id)) = (self.view.as_ref(), self.doc_id) else {
            return;
        };
        let page_index = view.current_page() - 1;
        let scale = view.scale();

        let request = self.next_request_id();
        self.pending_render = Some(request);
        self.render_fault = None;

        if self
            .command_tx
            .send(ViewerCommand::RenderPage {
                request,
                doc_id,
                page_index,
                scale,
            })
            .is_err()
        {
            self.pending_render = None;
            self.render_fault = Some(ViewFault::Render {
                page: page_index + 1,
                message: ViewerError::WorkerGone.to_string(),
            });
        }
        self.notify();
    }

    fn prefetch_neighbors(&self) {
        if !self.options.prefetch_neighbors {
            return;
        }
        let (Some(view), Some(doc_id)) = (self.view.as_ref(), self.doc_id) else {
            return;
        };
        let page_indices = view.neighbor_indices();
        if page_indices.is_empty() {
            return;
        }
        let _ = self.command_tx.send(ViewerCommand::PrefetchPages {
            doc_id,
            page_indices,
            scale: view.scale(),
        });
    }

    // =========================================================================
    // Worker updates
    // =========================================================================

    /// Apply one update from the worker. Returns false for stale or unrelated updates.
    pub fn apply(&mut self, update: ViewerUpdate) -> bool {
        match update {
            ViewerUpdate::Loaded {
                request,
                doc_id,
                page_sizes,
            } => {
                if self.pending_load != Some(request) {
                    log::debug!("Discarding stale load result {:?}", request);
                    let _ = self.command_tx.send(ViewerCommand::Close { doc_id });
                    return false;
                }
                self.pending_load = None;

                match DocumentView::new(
                    page_sizes,
                    self.options.initial_scale,
                    self.options.scale_bounds(),
                ) {
                    Ok(view) => {
                        self.view = Some(view);
                        self.doc_id = Some(doc_id);
                        self.phase = Phase::Ready;
                        self.render();
                    }
                    Err(e) => {
                        let _ = self.command_tx.send(ViewerCommand::Close { doc_id });
                        self.phase = Phase::Failed(ViewFault::Load(e.to_string()));
                        self.notify();
                    }
                }
                true
            }
            ViewerUpdate::LoadFailed { request, message } => {
                if self.pending_load != Some(request) {
                    log::debug!("Discarding stale load failure {:?}", request);
                    return false;
                }
                self.pending_load = None;
                self.phase = Phase::Failed(ViewFault::Load(message));
                self.notify();
                true
            }
            ViewerUpdate::PageRendered {
                request,
                doc_id,
                page_index,
                scale,
                surface,
            } => {
                if !self.is_current_render(request, doc_id) {
                    log::debug!("Discarding stale render of page {}", page_index + 1);
                    return false;
                }
                self.pending_render = None;
                self.render_fault = None;
                self.displayed = Some(DisplayedPage {
                    page: page_index + 1,
                    scale,
                    surface,
                });
                self.notify();
                self.prefetch_neighbors();
                true
            }
            ViewerUpdate::RenderFailed {
                request,
                doc_id,
                page_index,
                message,
            } => {
                if !self.is_current_render(request, doc_id) {
                    log::debug!("Discarding stale render failure for page {}", page_index + 1);
                    return false;
                }
                self.pending_render = None;
                self.render_fault = Some(ViewFault::Render {
                    page: page_index + 1,
                    message,
                });
                self.notify();
                true
            }
            ViewerUpdate::Closed { .. } => false,
        }
    }

    fn is_current_render(&self, request: RequestId, doc_id: DocumentId) -> bool {
        self.pending_render == Some(request) && self.doc_id == Some(doc_id)
    }

    /// Apply updates from `update_rx` until no request is outstanding.
    ///
    /// Returns false if the worker went away first.
    pub async fn settle(&mut self, update_rx: &mut mpsc::UnboundedReceiver<ViewerUpdate>) -> bool {
        while self.is_busy() {
            match update_rx.recv().await {
                Some(update) => {
                    self.apply(update);
                }
                None => return false,
            }
        }
        true
    }
}
