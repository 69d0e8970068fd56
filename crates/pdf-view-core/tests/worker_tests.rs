mod common;

use common::ScriptedRenderer;
use pdf_view_core::*;
use tokio::sync::mpsc;

/// Queue `commands`, close the channel and run the worker until it drains
async fn run_to_completion(
    renderer: ScriptedRenderer,
    commands: Vec<ViewerCommand>,
) -> Vec<ViewerUpdate> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    for cmd in commands {
        command_tx.send(cmd).unwrap();
    }
    drop(command_tx);

    worker_task(renderer, 8, command_rx, update_tx).await;

    let mut updates = Vec::new();
    while let Ok(update) = update_rx.try_recv() {
        updates.push(update);
    }
    updates
}

fn load(request: u64) -> ViewerCommand {
    ViewerCommand::Load {
        request: RequestId(request),
        source: common::source(),
    }
}

fn render(request: u64, page_index: usize, scale: f32) -> ViewerCommand {
    ViewerCommand::RenderPage {
        request: RequestId(request),
        doc_id: DocumentId(0),
        page_index,
        scale,
    }
}

#[tokio::test]
async fn test_load_then_render() {
    let renderer = ScriptedRenderer::with_pages(3, 100.0, 200.0);
    let updates = run_to_completion(renderer, vec![load(1)]).await;
    match updates.as_slice() {
        [ViewerUpdate::Loaded {
            request,
            doc_id,
            page_sizes,
        }] => {
            assert_eq!(*request, RequestId(1));
            assert_eq!(*doc_id, DocumentId(0));
            assert_eq!(page_sizes, &vec![PageSize::new(100.0, 200.0); 3]);
        }
        other => panic!("unexpected updates: {:?}", other),
    }

    let renderer = ScriptedRenderer::with_pages(3, 100.0, 200.0);
    let updates = run_to_completion(renderer, vec![load(1), render(2, 1, 2.0)]).await;
    match updates.as_slice() {
        [
            ViewerUpdate::Loaded { .. },
            ViewerUpdate::PageRendered {
                request,
                page_index,
                surface,
                ..
            },
        ] => {
            assert_eq!(*request, RequestId(2));
            assert_eq!(*page_index, 1);
            assert_eq!((surface.width, surface.height), (200, 400));
        }
        other => panic!("unexpected updates: {:?}", other),
    }
}

#[tokio::test]
async fn test_decode_failure_reports_load_failed() {
    let renderer = ScriptedRenderer {
        fail_decode: true,
        ..ScriptedRenderer::with_pages(1, 100.0, 100.0)
    };
    let updates = run_to_completion(renderer, vec![load(5)]).await;
    assert!(matches!(
        updates.as_slice(),
        [ViewerUpdate::LoadFailed {
            request: RequestId(5),
            ..
        }]
    ));
}

#[tokio::test]
async fn test_empty_document_reports_load_failed() {
    let renderer = ScriptedRenderer::default();
    let updates = run_to_completion(renderer, vec![load(1)]).await;
    match updates.as_slice() {
        [ViewerUpdate::LoadFailed { message, .. }] => {
            assert_eq!(message, "Document has no pages");
        }
        other => panic!("unexpected updates: {:?}", other),
    }
}

#[tokio::test]
async fn test_queued_renders_are_coalesced() {
    let renderer = ScriptedRenderer::with_pages(5, 100.0, 100.0);
    let updates = run_to_completion(
        renderer.clone(),
        vec![
            load(1),
            render(2, 0, 1.0),
            render(3, 1, 1.0),
            render(4, 2, 1.0),
        ],
    )
    .await;

    let rendered: Vec<(RequestId, usize)> = updates
        .iter()
        .filter_map(|update| match update {
            ViewerUpdate::PageRendered {
                request,
                page_index,
                ..
            } => Some((*request, *page_index)),
            _ => None,
        })
        .collect();
    assert_eq!(rendered, vec![(RequestId(4), 2)]);
    assert_eq!(renderer.rendered_pages(), vec![2]);
}

#[tokio::test]
async fn test_other_commands_keep_their_order() {
    let renderer = ScriptedRenderer::with_pages(2, 100.0, 100.0);
    let updates = run_to_completion(
        renderer.clone(),
        vec![
            load(1),
            render(2, 0, 1.0),
            ViewerCommand::Close {
                doc_id: DocumentId(0),
            },
            render(3, 1, 1.0),
        ],
    )
    .await;

    assert!(matches!(
        updates.as_slice(),
        [
            ViewerUpdate::Loaded { .. },
            ViewerUpdate::PageRendered {
                request: RequestId(2),
                ..
            },
            ViewerUpdate::Closed { .. },
            ViewerUpdate::RenderFailed {
                request: RequestId(3),
                ..
            },
        ]
    ));
    assert_eq!(renderer.rendered_pages(), vec![0]);
}

#[tokio::test]
async fn test_render_failure_is_reported() {
    let renderer = ScriptedRenderer::with_pages(3, 100.0, 100.0).failing_on(1);
    let updates = run_to_completion(renderer, vec![load(1), render(2, 1, 1.0)]).await;
    match updates.as_slice() {
        [
            ViewerUpdate::Loaded { .. },
            ViewerUpdate::RenderFailed {
                request,
                page_index,
                message,
                ..
            },
        ] => {
            assert_eq!(*request, RequestId(2));
            assert_eq!(*page_index, 1);
            assert!(message.contains("cannot draw page 1"));
        }
        other => panic!("unexpected updates: {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_document_fails_render() {
    let renderer = ScriptedRenderer::with_pages(1, 100.0, 100.0);
    let updates = run_to_completion(renderer, vec![render(1, 0, 1.0)]).await;
    assert!(matches!(
        updates.as_slice(),
        [ViewerUpdate::RenderFailed {
            doc_id: DocumentId(0),
            ..
        }]
    ));
}

#[tokio::test]
async fn test_repeat_render_hits_cache() {
    let renderer = ScriptedRenderer::with_pages(2, 100.0, 100.0);
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(renderer.clone(), 8, command_rx, update_tx));

    command_tx.send(load(1)).unwrap();
    assert!(matches!(
        update_rx.recv().await,
        Some(ViewerUpdate::Loaded { .. })
    ));

    for request in [2, 3] {
        command_tx.send(render(request, 1, 1.5)).unwrap();
        match update_rx.recv().await {
            Some(ViewerUpdate::PageRendered {
                request: got,
                surface,
                ..
            }) => {
                assert_eq!(got, RequestId(request));
                assert_eq!(surface.width, 150);
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }
    assert_eq!(renderer.rendered_pages(), vec![1]);

    // A different scale is a different surface
    command_tx.send(render(4, 1, 1.0)).unwrap();
    assert!(update_rx.recv().await.is_some());
    assert_eq!(renderer.rendered_pages(), vec![1, 1]);

    drop(command_tx);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_prefetch_warms_cache_silently() {
    let renderer = ScriptedRenderer::with_pages(4, 100.0, 100.0);
    let updates = run_to_completion(
        renderer.clone(),
        vec![
            load(1),
            ViewerCommand::PrefetchPages {
                doc_id: DocumentId(0),
                page_indices: vec![1, 2, 9],
                scale: 1.0,
            },
        ],
    )
    .await;

    assert_eq!(updates.len(), 1, "prefetch sends no updates");
    assert_eq!(renderer.rendered_pages(), vec![1, 2, 9]);
}

#[tokio::test]
async fn test_prefetch_yields_to_navigation() {
    let renderer = ScriptedRenderer::with_pages(4, 100.0, 100.0);
    let updates = run_to_completion(
        renderer.clone(),
        vec![
            load(1),
            ViewerCommand::PrefetchPages {
                doc_id: DocumentId(0),
                page_indices: vec![1, 2],
                scale: 1.0,
            },
            render(2, 3, 1.0),
        ],
    )
    .await;

    assert_eq!(updates.len(), 2);
    assert_eq!(renderer.rendered_pages(), vec![3]);
}

#[tokio::test]
async fn test_close_drops_document() {
    let renderer = ScriptedRenderer::with_pages(1, 100.0, 100.0);
    let updates = run_to_completion(
        renderer,
        vec![
            load(1),
            ViewerCommand::Close {
                doc_id: DocumentId(0),
            },
        ],
    )
    .await;
    assert!(matches!(
        updates.as_slice(),
        [
            ViewerUpdate::Loaded { .. },
            ViewerUpdate::Closed {
                doc_id: DocumentId(0)
            }
        ]
    ));
}

#[tokio::test]
async fn test_each_load_gets_a_fresh_id() {
    let renderer = ScriptedRenderer::with_pages(1, 100.0, 100.0);
    let updates = run_to_completion(renderer, vec![load(1), load(2)]).await;
    let ids: Vec<DocumentId> = updates
        .iter()
        .filter_map(|update| match update {
            ViewerUpdate::Loaded { doc_id, .. } => Some(*doc_id),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec![DocumentId(0), DocumentId(1)]);
}
