//! Plain-text exports of a finished curation.
//!
//! Pure formatting over the three artifacts. Nothing here calls the
//! provider or touches pipeline state.

use crate::pipeline::PipelineRun;
use crate::prompt::bullet_list;
use crate::types::{ContentPlan, CurationInput, HistoryResult};
use chrono::NaiveDate;

const BRAND: &str = "부산 소울 큐레이터";
const RULE: &str = "==================================================";
const NO_SOURCES: &str = "출처 정보 없음";

fn sources(history: &HistoryResult) -> Option<String> {
    history
        .source_urls
        .as_ref()
        .filter(|urls| !urls.is_empty())
        .map(|urls| urls.iter().cloned().collect::<Vec<_>>().join("\n"))
}

fn hashtags(plan: &ContentPlan) -> String {
    plan.hashtags.join(" ")
}

/// The history sheet for one location.
pub fn history_sheet(location: &str, history: &HistoryResult) -> String {
    format!(
        "[{BRAND} - 역사적 사실]\n\n장소: {location}\n\n[요약]\n{}\n\n[주요 사실]\n{}\n\n[출처]\n{}",
        history.summary,
        bullet_list(&history.facts),
        sources(history).unwrap_or_else(|| "-".to_string()),
    )
}

/// The content plan sheet.
pub fn plan_sheet(plan: &ContentPlan) -> String {
    format!(
        "[{BRAND} - 문화 콘텐츠 기획]\n\n형태: {}\n제목: {}\n컨셉: {}\n\n[스토리라인]\n{}\n\n[공감 포인트]\n{}\n\n[홍보 문구]\n{}\n\n[해시태그]\n{}",
        plan.content_type,
        plan.title,
        plan.concept,
        plan.storyline,
        plan.empathy_point,
        plan.social_post_text,
        hashtags(plan),
    )
}

fn section(number: u8, title: &str) -> String {
    format!("{RULE}\n{number}. {title}\n{RULE}")
}

/// The combined report, dated `issued`.
pub fn full_report(
    input: &CurationInput,
    history: &HistoryResult,
    plan: &ContentPlan,
    issued: NaiveDate,
) -> String {
    let overview = format!(
        "{}\n• 대상 장소: {}\n• 사용자 감정: {}\n• 콘텐츠 형태: {}",
        section(1, "큐레이션 개요"),
        input.location,
        input.emotion,
        input.content_type,
    );
    let history_part = format!(
        "{}\n[요약]\n{}\n\n[주요 사실]\n{}\n\n[출처]\n{}",
        section(2, "역사적 사실 (History)"),
        history.summary,
        bullet_list(&history.facts),
        sources(history).unwrap_or_else(|| NO_SOURCES.to_string()),
    );
    let plan_part = format!(
        "{}\n• 제목: {}\n• 컨셉: {}\n\n[스토리라인]\n{}\n\n[공감 포인트]\n{}",
        section(3, "문화 콘텐츠 기획안 (Content Plan)"),
        plan.title,
        plan.concept,
        plan.storyline,
        plan.empathy_point,
    );
    let social_part = format!(
        "{}\n[포스트 멘트]\n{}\n\n[해시태그]\n{}",
        section(4, "소셜 미디어 홍보 (Social Media)"),
        plan.social_post_text,
        hashtags(plan),
    );

    format!(
        "[{BRAND} - 기획 결과 보고서]\n발행일: {}\n\n{overview}\n\n{history_part}\n\n{plan_part}\n\n{social_part}\n\n\
         --------------------------------------------------\n\
         * 본 보고서는 {BRAND} AI(Gemini)에 의해 생성되었습니다.\n",
        issued.format("%Y-%m-%d"),
    )
}

/// [`full_report`] for a completed run, dated today in local time.
///
/// Returns `None` unless the run has completed.
pub fn full_report_for_run(run: &PipelineRun) -> Option<String> {
    let (history, plan, _) = run.artifacts()?;
    let input = run.input.as_ref()?;
    let today = chrono::Local::now().date_naive();
    Some(full_report(input, history, plan, today))
}

/// Suggested file names for the three exports.
pub fn file_name(kind: ReportKind, location: &str) -> String {
    let prefix = match kind {
        ReportKind::History => "History",
        ReportKind::Plan => "Plan",
        ReportKind::Full => "Report",
    };
    let safe: String = location
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}.txt", prefix, safe)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    History,
    Plan,
    Full,
}
