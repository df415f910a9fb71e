use perfreview_core::db::open_db_in_memory;
use perfreview_core::model::profile::{CompetencyDraft, ProfileWithCompetencies};
use perfreview_core::repo::rating_repo::RatingRepository;
use perfreview_core::service::evaluation_service::NOT_RATED_LABEL;
use perfreview_core::view::CompetenciesView;
use perfreview_core::{
    CompetencySheet, EmployeeDraft, EmployeeRecord, EmployeeService, EvaluationService,
    ProfileDraft, ProfileService, RatingValue, ServiceError, SqliteReviewRepository,
    ValidationError,
};
use rusqlite::Connection;

fn seed(conn: &Connection, competencies: &[&str]) -> (ProfileWithCompetencies, EmployeeRecord) {
    let repo = SqliteReviewRepository::try_new(conn).unwrap();
    let profile = ProfileService::new(repo)
        .create_profile(&ProfileDraft {
            name: "Engineer".to_string(),
            description: String::new(),
            competencies: competencies
                .iter()
                .map(|name| CompetencyDraft::new(*name, format!("{name} skills")))
                .collect(),
        })
        .unwrap();
    let employee = EmployeeService::new(repo)
        .create_employee(&EmployeeDraft::new(
            "Jane Doe",
            "Engineer",
            Some(profile.profile.id),
        ))
        .unwrap();
    (profile, employee)
}

#[test]
fn rating_twice_keeps_one_row_with_latest_value() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn, &["Code Quality"]);
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let service = EvaluationService::new(repo);
    let competency = profile.competencies[0].id;

    let first = service
        .rate_competency(employee.id(), competency, 3)
        .unwrap();
    let second = service
        .rate_competency(employee.id(), competency, 7)
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.rating.get(), 7);
    let ratings = repo.list_ratings(employee.id()).unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].rating.get(), 7);
}

#[test]
fn ratings_outside_one_to_ten_are_rejected_before_store() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn, &["Code Quality"]);
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let service = EvaluationService::new(repo);
    let competency = profile.competencies[0].id;

    for value in [0, 11, -3] {
        let err = service
            .rate_competency(employee.id(), competency, value)
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::RatingOutOfRange(rejected)) if rejected == value
        ));
    }
    assert!(repo.list_ratings(employee.id()).unwrap().is_empty());

    for value in [1, 10] {
        service
            .rate_competency(employee.id(), competency, value)
            .unwrap();
    }
    assert_eq!(RatingValue::all().count(), 10);
}

#[test]
fn rating_pairs_are_independent_per_competency_and_employee() {
    let conn = open_db_in_memory().unwrap();
    let (profile, jane) = seed(&conn, &["Rust", "SQL"]);
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let service = EvaluationService::new(repo);
    let john = EmployeeService::new(repo)
        .create_employee(&EmployeeDraft::new(
            "John Roe",
            "Engineer",
            Some(profile.profile.id),
        ))
        .unwrap();

    service
        .rate_competency(jane.id(), profile.competencies[0].id, 5)
        .unwrap();
    service
        .rate_competency(jane.id(), profile.competencies[1].id, 6)
        .unwrap();
    service
        .rate_competency(john.id(), profile.competencies[0].id, 2)
        .unwrap();

    assert_eq!(repo.list_ratings(jane.id()).unwrap().len(), 2);
    let johns = repo.list_ratings(john.id()).unwrap();
    assert_eq!(johns.len(), 1);
    assert_eq!(johns[0].rating.get(), 2);
}

#[test]
fn competency_sheet_pairs_definition_order_with_ratings() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn, &["Rust", "Testing", "Reviews"]);
    let service = EvaluationService::new(SqliteReviewRepository::try_new(&conn).unwrap());

    service
        .rate_competency(employee.id(), profile.competencies[1].id, 8)
        .unwrap();

    let CompetencySheet::Ready(rows) = service.competency_sheet(&employee).unwrap() else {
        panic!("expected rated competencies");
    };
    let labels: Vec<(String, String)> = rows
        .iter()
        .map(|row| (row.competency.name.clone(), row.rating_label()))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("Rust".to_string(), NOT_RATED_LABEL.to_string()),
            ("Testing".to_string(), "8/10".to_string()),
            ("Reviews".to_string(), NOT_RATED_LABEL.to_string()),
        ]
    );
    assert!(rows.iter().all(|row| row.has_description()));
}

#[test]
fn profile_without_competencies_yields_empty_sheet() {
    let conn = open_db_in_memory().unwrap();
    let (_, employee) = seed(&conn, &[]);
    let service = EvaluationService::new(SqliteReviewRepository::try_new(&conn).unwrap());

    assert_eq!(
        service.competency_sheet(&employee).unwrap(),
        CompetencySheet::NoCompetencies
    );
}

#[test]
fn unassigned_employee_sheet_does_not_touch_competencies() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let employee = EmployeeService::new(repo)
        .create_employee(&EmployeeDraft::new("Jane Doe", "Engineer", None))
        .unwrap();
    let service = EvaluationService::new(repo);

    // Any competency or rating query would fail from here on.
    conn.execute_batch(
        "PRAGMA foreign_keys = OFF;
         DROP TABLE goal_competencies;
         DROP TABLE competency_ratings;
         DROP TABLE competencies;",
    )
    .unwrap();

    assert_eq!(
        service.competency_sheet(&employee).unwrap(),
        CompetencySheet::NoProfileAssigned
    );
    assert!(service.linkable_competencies(&employee).unwrap().is_empty());
}

#[test]
fn competencies_view_rates_and_refetches() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn, &["Code Quality"]);
    let service = EvaluationService::new(SqliteReviewRepository::try_new(&conn).unwrap());

    let mut view = CompetenciesView::load(&service, employee);
    let competency = profile.competencies[0].id;

    view.rate(&service, competency, 4).unwrap();
    view.rate(&service, competency, 9).unwrap();
    assert!(view.rate(&service, competency, 12).is_err());

    let Some(CompetencySheet::Ready(rows)) = view.sheet() else {
        panic!("expected rated competencies");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rating_label(), "9/10");
    assert!(!view.is_stale());
}

#[test]
fn failed_competencies_load_has_no_sheet() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn, &["Code Quality"]);
    let service = EvaluationService::new(SqliteReviewRepository::try_new(&conn).unwrap());

    conn.execute_batch("ALTER TABLE competency_ratings RENAME TO competency_ratings_moved;")
        .unwrap();

    let mut view = CompetenciesView::load(&service, employee);
    assert!(view.is_stale());
    assert_eq!(view.sheet(), None);
    assert!(view.refresh(&service).is_err());
    assert_eq!(view.sheet(), None);

    conn.execute_batch("ALTER TABLE competency_ratings_moved RENAME TO competency_ratings;")
        .unwrap();
    view.refresh(&service).unwrap();
    assert!(!view.is_stale());
    let Some(CompetencySheet::Ready(rows)) = view.sheet() else {
        panic!("expected competencies after recovery");
    };
    assert_eq!(rows[0].competency.id, profile.competencies[0].id);
    assert_eq!(rows[0].rating, None);
}
