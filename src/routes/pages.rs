use axum::{
    extract::{Query, State},
    response::Html,
};

use dalryeok_core::{
    format_datetime, holiday_badge, preview, to_key, weeks, CalendarDate, CalendarView,
    EventsByKey, GridCell, Snapshot,
};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::{local_today, month_param, MonthQuery, PREVIEW_TITLES};
use crate::state::AppState;

const WEEKDAY_NAMES: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// GET / - The month page.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
    user: CurrentUser,
) -> Result<Html<String>, ApiError> {
    let today = local_today();
    let view = query.view(today);
    let subscription = state.store.subscribe(&state.org_id).await?;
    let snapshot = subscription.borrow().clone();

    Ok(Html(render_index(view, today, &snapshot, user.is_admin)))
}

/// Escape text for HTML element and attribute content.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page_href(month: CalendarDate, selected: CalendarDate) -> String {
    format!("/?month={}&amp;selected={}", month_param(month), to_key(selected))
}

fn render_cell(cell: &GridCell, view: &CalendarView, today: CalendarDate, events: &EventsByKey) -> String {
    let day_events = dalryeok_core::events_on(events, cell.date);
    let holiday = cell.holiday_name();

    let mut classes = vec!["cell"];
    if !cell.in_month {
        classes.push("dimmed");
    }
    if cell.is_red_day() {
        classes.push("red");
    }
    if cell.date == view.selected_date {
        classes.push("selected");
    }

    let mut badges = String::new();
    if cell.is_today(today) {
        badges.push_str(r#"<span class="badge today">오늘</span>"#);
    }
    if !holiday.is_empty() {
        badges.push_str(&format!(
            r#"<span class="badge holiday" title="{}">{}</span>"#,
            escape(holiday),
            escape(holiday_badge(holiday))
        ));
    }

    let p = preview(day_events, PREVIEW_TITLES);
    let mut previews: String = p
        .titles
        .iter()
        .map(|t| format!(r#"<div class="preview">• {}</div>"#, escape(t)))
        .collect();
    if p.remaining > 0 {
        previews.push_str(&format!(r#"<div class="more">그 외 {}건…</div>"#, p.remaining));
    }

    let count = if day_events.is_empty() {
        String::new()
    } else {
        format!(r#"<span class="count">{}건</span>"#, day_events.len())
    };

    format!(
        r#"<a class="{classes}" href="{href}" data-date="{key}">
            <div class="cell-head"><span class="day">{day}</span><span class="badges">{badges}</span></div>
            {previews}
            {count}
        </a>"#,
        classes = classes.join(" "),
        href = page_href(view.reference_month, cell.date),
        key = to_key(cell.date),
        day = cell.date.day(),
    )
}

fn render_selected(view: &CalendarView, events: &EventsByKey, is_admin: bool) -> String {
    let selected = view.selected_date;
    let day_events = view.selected_events(events);

    let items: String = if day_events.is_empty() {
        r#"<p class="empty">등록된 일정이 없습니다.</p>"#.to_string()
    } else {
        let lis: String = day_events
            .iter()
            .map(|e| {
                let body = if e.body.is_empty() {
                    String::new()
                } else {
                    format!(r#"<p class="body">{}</p>"#, escape(&e.body))
                };
                let delete = if is_admin {
                    format!(
                        r#"<form method="post" action="/events/{id}/delete">
                            <input type="hidden" name="month" value="{month}">
                            <input type="hidden" name="selected" value="{selected}">
                            <button type="submit" class="danger">삭제</button>
                        </form>"#,
                        id = e.id,
                        month = month_param(view.reference_month),
                        selected = to_key(selected),
                    )
                } else {
                    String::new()
                };
                format!(
                    r#"<li class="event"><div class="title">{title}</div>{body}<div class="meta">등록: {created}</div>{delete}</li>"#,
                    title = escape(&e.title),
                    created = format_datetime(e.created_at),
                )
            })
            .collect();
        format!(r#"<ul class="events">{lis}</ul>"#)
    };

    let add_form = if is_admin {
        format!(
            r#"<form class="add" method="post" action="/events">
                <h3>일정 추가</h3>
                <label>날짜 <input type="date" name="date_key" value="{key}" required></label>
                <label>제목 * <input type="text" name="title" placeholder="예) 서울 본원 출장 (오전)" required></label>
                <label>내용 <textarea name="body" rows="4" placeholder="상세 내용/장소/연락처 등"></textarea></label>
                <button type="submit">저장</button>
            </form>"#,
            key = to_key(selected)
        )
    } else {
        String::new()
    };

    format!(
        r#"<section id="selected-day">
            <h2>{y}년 {m}월 {d}일</h2>
            {items}
            {add_form}
        </section>"#,
        y = selected.year(),
        m = selected.month(),
        d = selected.day(),
    )
}

fn render_month_list(view: &CalendarView, events: &EventsByKey) -> String {
    let items = view.month_events(events);
    if items.is_empty() {
        return r#"<p class="empty">이번 달 등록된 일정이 없습니다.</p>"#.to_string();
    }
    let lis: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<li><a href="{href}"><span class="title">{title}</span><span class="key">{key}</span></a></li>"#,
                href = page_href(view.reference_month, item.date),
                title = escape(&item.event.title),
                key = item.event.date_key,
            )
        })
        .collect();
    format!(r#"<ul class="month-events">{lis}</ul>"#)
}

fn render_index(view: CalendarView, today: CalendarDate, snapshot: &Snapshot, is_admin: bool) -> String {
    let events = snapshot.by_key();
    let grid = view.grid();

    let header: String = WEEKDAY_NAMES
        .iter()
        .map(|d| format!(r#"<div class="weekday">{d}</div>"#))
        .collect();

    let rows: String = weeks(&grid)
        .map(|week| {
            let cells: String = week
                .iter()
                .map(|cell| render_cell(cell, &view, today, &events))
                .collect();
            format!(r#"<div class="week">{cells}</div>"#)
        })
        .collect();

    let hint = if is_admin {
        "날짜를 선택한 뒤 오른쪽 양식으로 일정을 추가하세요."
    } else {
        "읽기는 전체 공개, 작성/삭제는 관리자만 가능합니다."
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{year}년 {month}월 - 달력</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body data-version="{version}">
    <header>
        <div>
            <h1>{year}년 {month}월</h1>
            <p class="hint">{hint}</p>
        </div>
        <nav>
            <a href="{prev}">이전 달</a>
            <a href="{today_href}">오늘</a>
            <a href="{next}">다음 달</a>
        </nav>
    </header>
    <main>
        <section id="calendar">
            <div class="week header">{header}</div>
            {rows}
        </section>
        <aside>
            {selected}
            <section id="month-events">
                <h3>이달 전체 일정</h3>
                {month_list}
            </section>
        </aside>
    </main>
    <script src="/static/app.js"></script>
</body>
</html>"##,
        year = view.reference_month.year(),
        month = view.reference_month.month(),
        version = snapshot.version,
        prev = page_href(view.prev_month().reference_month, view.selected_date),
        next = page_href(view.next_month().reference_month, view.selected_date),
        today_href = page_href(view.go_today(today).reference_month, view.selected_date),
        selected = render_selected(&view, &events, is_admin),
        month_list = render_month_list(&view, &events),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalryeok_core::{DateKey, Event};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    fn event(key: &str, title: &str, created_at: i64) -> Event {
        Event {
            id: Uuid::new_v4(),
            org_id: "org".to_string(),
            date_key: DateKey::parse_canonical(key).unwrap(),
            title: title.to_string(),
            body: String::new(),
            created_at,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_index_structure() {
        let snapshot = Snapshot {
            version: 3,
            events: vec![
                event("2024-03-05", "<script>", 1),
                event("2024-03-05", "둘째", 2),
                event("2024-03-05", "셋째", 3),
            ],
        };
        let view = CalendarView::with_selection(date(2024, 3, 1), date(2024, 3, 5));
        let html = render_index(view, date(2024, 3, 14), &snapshot, false);

        assert!(html.contains("2024년 3월"));
        assert!(html.contains(r#"data-version="3""#));
        assert_eq!(html.matches(r#"class="week""#).count(), 6);
        assert_eq!(html.matches("data-date=").count(), 42);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("그 외 1건…"));
        assert!(html.contains("3건"));
        assert!(html.contains("삼일절"));
        assert!(html.contains("오늘"));
        assert!(html.contains("2024년 3월 5일"));
        assert!(!html.contains(r#"action="/events""#));
    }

    #[test]
    fn test_render_index_admin_controls() {
        let snapshot = Snapshot {
            version: 1,
            events: vec![event("2024-03-05", "회의", 1)],
        };
        let view = CalendarView::with_selection(date(2024, 3, 1), date(2024, 3, 5));
        let html = render_index(view, date(2024, 3, 14), &snapshot, true);

        assert!(html.contains(r#"action="/events""#));
        assert!(html.contains("/delete"));
        assert!(html.contains(r#"value="2024-03-05""#));
    }

    #[test]
    fn test_render_empty_month() {
        let view = CalendarView::with_selection(date(2024, 4, 1), date(2024, 4, 1));
        let html = render_index(view, date(2024, 3, 14), &Snapshot::default(), false);
        assert!(html.contains("이번 달 등록된 일정이 없습니다."));
        assert!(html.contains("등록된 일정이 없습니다."));
        assert!(html.contains("month=2024-03"));
        assert!(html.contains("month=2024-05"));
    }
}
