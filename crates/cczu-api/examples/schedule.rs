//! End-to-end demo: SSO login, service login, print the current timetable.
//!
//! Reads the credential pair from `CCZU_USERNAME` / `CCZU_PASSWORD`.

use cczu_api::{parse_week_matrix, Account, CczuClient, CczuError, JwqywxSession};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), CczuError> {
    tracing_subscriber::fmt::init();

    let username = std::env::var("CCZU_USERNAME").unwrap_or_default();
    let password = std::env::var("CCZU_PASSWORD").unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        eprintln!("set CCZU_USERNAME and CCZU_PASSWORD first");
        return Ok(());
    }

    let client = Arc::new(CczuClient::new(Account::new(username, password))?);

    match client.universal_login().await? {
        Some(identity) => println!("logged in through the VPN tunnel as {}", identity.userid),
        None => println!("logged in against the SSO portal directly"),
    }

    let session = JwqywxSession::new(client);
    let login = session.login().await?;
    if let Some(user) = login.message.first() {
        println!("academic-affairs login: {}", user.display_name);
    }

    let matrix = session.current_class_schedule().await?;
    let mut courses = parse_week_matrix(&matrix);
    courses.sort_by_key(|course| (course.day_of_week, course.time_slot));

    let weekday_names = ["一", "二", "三", "四", "五", "六", "日"];
    let mut current_day = 0;
    for course in &courses {
        if course.day_of_week != current_day {
            current_day = course.day_of_week;
            println!("\n周{}:", weekday_names[(current_day - 1) as usize]);
        }
        let weeks: Vec<String> = course.weeks.iter().map(u32::to_string).collect();
        println!(
            "  第{}节 {} / {} / {} / 周次 {}",
            course.time_slot,
            course.name,
            course.teacher,
            course.location,
            weeks.join(",")
        );
    }

    // The login kicked off a best-effort training-plan prefetch; claim it
    // so the demo can show the totals.
    if let Some(prefetch) = session.take_plan_prefetch() {
        if let Ok(Ok(plan)) = prefetch.await {
            println!(
                "\n培养方案: {} ({} 年) 总学分 {}",
                plan.major_name, plan.duration_years, plan.total_credits
            );
        }
    }

    Ok(())
}
