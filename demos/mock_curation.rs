//! Example: a full curation run against the mock backend.
//!
//! Run with: `cargo run --example mock_curation`
//! Add `-- --live` to call Gemini instead (needs `GEMINI_API_KEY`, a `.env`
//! file works). Set `RUST_LOG=soul_curator=debug` to see each provider call.

use serde_json::json;
use soul_curator::backend::{MockBackend, MockReply};
use soul_curator::report::{self, ReportKind};
use soul_curator::{CuratorConfig, Event, EventHandler, ExecCtx, FnEventHandler};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn canned_replies() -> Vec<MockReply> {
    vec![
        MockReply::grounded(
            "```json\n{\"summary\": \"한국전쟁 당시 피란민들이 헤어진 가족을 기다리던 장소로, 부산 원도심의 상징이 되었다.\", \"facts\": [\"1950년대 피란민의 만남의 장소\", \"주변에 판자촌과 시장이 형성됨\", \"계단 위에 아코디언 켜는 사람 동상이 있다\"]}\n```",
            ["https://example.org/busan/40-steps"],
        ),
        MockReply::text(
            json!({
                "contentType": "에세이",
                "title": "계단 하나, 안부 하나",
                "concept": "기다림의 장소에서 오늘의 그리움을 꺼내 쓰는 짧은 에세이",
                "storyline": "타지에서 일하는 화자가 명절 대신 40계단을 찾아 할머니의 피란 이야기를 떠올린다",
                "empathyPoint": "그리움은 아직 이어져 있다는 신호라는 위로",
                "socialPostText": "계단 하나에 안부 하나 🌙\n기다리는 마음은 여기서도 따뜻했대",
                "hashtags": ["#40계단", "#부산여행", "#그리움"]
            })
            .to_string(),
        ),
        MockReply::image("image/png", "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk"),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("soul_curator=info"))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let live = std::env::args().any(|arg| arg == "--live");
    let config = CuratorConfig::from_env()?;

    let handler: Arc<dyn EventHandler> = Arc::new(FnEventHandler(|event: Event| {
        if let Event::StageStart { stage, model } = event {
            println!("  -> {} ({})", stage, model);
        }
    }));

    let ctx = if live {
        config.build_ctx()?
    } else {
        config.build_ctx_with_backend(Arc::new(MockBackend::new(canned_replies())))?
    };
    let ctx = ExecCtx {
        event_handler: Some(handler),
        ..ctx
    };
    let mut pipeline = config.build_pipeline_with_ctx(ctx);

    println!("Curating 40계단 / 그리움 / 에세이 ...");
    let outcome = pipeline
        .submit_with_progress("40계단", "그리움", "에세이", |state| {
            if state.is_working() {
                println!("[{}]", state);
            }
        })
        .await;

    match outcome {
        Ok(run) => {
            if let Some(text) = report::full_report_for_run(run) {
                println!("\n{}", text);
            }
            if let Some(poster) = &run.poster {
                println!(
                    "Poster: {} ({} chars)",
                    poster.mime_type().unwrap_or("?"),
                    poster.image_url.len()
                );
            }
            println!("Save as: {}", report::file_name(ReportKind::Full, "40계단"));
        }
        Err(e) => {
            eprintln!("{} ({:?})", e, e.kind());
            let run = pipeline.run();
            if let Some(history) = &run.history {
                println!("\n{}", report::history_sheet(&history.location, history));
            }
        }
    }

    Ok(())
}
