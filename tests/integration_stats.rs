use lexidrag::config::Config;
use lexidrag::game::{GameKind, PairingGame};
use lexidrag::geometry::Canvas;
use lexidrag::item::{ItemId, PracticeItem};
use lexidrag::runtime::ManualClock;
use lexidrag::session::SessionController;
use lexidrag::simulate::Autoplayer;
use lexidrag::stats::StatsDb;
use tempfile::tempdir;

#[test]
fn simulated_session_lands_in_sqlite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stats").join("outcomes.db");

    let clock = ManualClock::new();
    let config = Config::default();
    let db = StatsDb::open(&path).unwrap();
    let mut session = SessionController::new(PairingGame::new(&config), config, db)
        .with_clock(clock.clone())
        .with_seed(8);
    session.set_items(
        (0..10)
            .map(|i| PracticeItem::new(i as ItemId, format!("p{i}"), format!("a{i}")))
            .collect(),
    );
    session.initialize(Canvas::new(420.0, 900.0));

    let report = Autoplayer::new(8, 0.25).play(&mut session, &clock);
    assert!(report.completed);
    let attempts = report.progress.attempts() as u64;
    drop(session);

    let db = StatsDb::open(&path).unwrap();
    let summary = db.game_summary(GameKind::Pairing).unwrap();
    assert_eq!(summary.attempts, attempts);
    assert_eq!(summary.successes, report.progress.correct as u64);
    assert_eq!(db.recent(100).unwrap().len() as u64, attempts);
}
