use perfreview_core::db::open_db_in_memory;
use perfreview_core::model::profile::{CompetencyDraft, CompetencyId, ProfileWithCompetencies};
use perfreview_core::repo::goal_repo::GoalRepository;
use perfreview_core::view::GoalsView;
use perfreview_core::{
    EmployeeDraft, EmployeeRecord, EmployeeService, EvaluationService, GoalDraft, ProfileDraft,
    ProfileService, ServiceError, SqliteReviewRepository, ValidationError,
};
use rusqlite::Connection;
use std::collections::BTreeSet;
use uuid::Uuid;

fn seed(conn: &Connection) -> (ProfileWithCompetencies, EmployeeRecord) {
    let repo = SqliteReviewRepository::try_new(conn).unwrap();
    let profile = ProfileService::new(repo)
        .create_profile(&ProfileDraft {
            name: "Engineer".to_string(),
            description: String::new(),
            competencies: ["Collaboration", "Architecture", "Budgeting"]
                .into_iter()
                .map(|name| CompetencyDraft::new(name, ""))
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

fn link_row_ids(conn: &Connection, competency: CompetencyId) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT id FROM goal_competencies WHERE competency_id = ?1;")
        .unwrap();
    let rows = stmt
        .query_map([competency.to_string()], |row| row.get(0))
        .unwrap();
    rows.collect::<Result<Vec<String>, _>>().unwrap()
}

#[test]
fn goal_links_are_reconciled_by_symmetric_difference() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn);
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let service = EvaluationService::new(repo);
    let a = profile.competencies[0].id;
    let b = profile.competencies[1].id;
    let c = profile.competencies[2].id;

    let goal = service
        .create_goal(employee.id(), &GoalDraft::new("Ship the new API", [a, b]))
        .unwrap();
    assert_eq!(goal.competency_ids(), BTreeSet::from([a, b]));
    let b_link_before = link_row_ids(&conn, b);

    let plan = repo
        .replace_goal_competencies(goal.goal.id, &BTreeSet::from([b, c]))
        .unwrap();
    assert_eq!(plan.remove, vec![a]);
    assert_eq!(plan.add, vec![c]);
    assert_eq!(plan.keep, vec![b]);

    let reloaded = repo.get_goal(goal.goal.id).unwrap().unwrap();
    assert_eq!(reloaded.competency_ids(), BTreeSet::from([b, c]));
    assert_eq!(link_row_ids(&conn, b), b_link_before);
    assert!(link_row_ids(&conn, a).is_empty());
}

#[test]
fn failed_relink_keeps_previous_links() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn);
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let service = EvaluationService::new(repo);
    let a = profile.competencies[0].id;
    let b = profile.competencies[1].id;

    let goal = service
        .create_goal(employee.id(), &GoalDraft::new("Lead the migration", [a]))
        .unwrap();
    let a_link_before = link_row_ids(&conn, a);

    let dangling = Uuid::new_v4();
    assert!(repo
        .replace_goal_competencies(goal.goal.id, &BTreeSet::from([b, dangling]))
        .is_err());

    let reloaded = repo.get_goal(goal.goal.id).unwrap().unwrap();
    assert_eq!(reloaded.competency_ids(), BTreeSet::from([a]));
    assert_eq!(link_row_ids(&conn, a), a_link_before);
    assert!(link_row_ids(&conn, b).is_empty());

    let plan = repo
        .replace_goal_competencies(goal.goal.id, &BTreeSet::from([b]))
        .unwrap();
    assert_eq!(plan.remove, vec![a]);
    assert_eq!(plan.add, vec![b]);
}

#[test]
fn relinking_to_same_set_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn);
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let service = EvaluationService::new(repo);
    let a = profile.competencies[0].id;

    let goal = service
        .create_goal(employee.id(), &GoalDraft::new("Mentor a junior", [a]))
        .unwrap();
    let plan = repo
        .replace_goal_competencies(goal.goal.id, &BTreeSet::from([a]))
        .unwrap();
    assert!(plan.is_noop());
}

#[test]
fn clearing_goal_links_inserts_nothing() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn);
    let service = EvaluationService::new(SqliteReviewRepository::try_new(&conn).unwrap());
    let ids: Vec<CompetencyId> = profile.competencies.iter().map(|c| c.id).collect();

    let goal = service
        .create_goal(employee.id(), &GoalDraft::new("Broad growth", ids))
        .unwrap();
    let updated = service
        .update_goal(goal.goal.id, &GoalDraft::new("Focused growth", []))
        .unwrap();

    assert_eq!(updated.goal.description, "Focused growth");
    assert!(updated.competencies.is_empty());
    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM goal_competencies;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(links, 0);
}

#[test]
fn goal_description_is_required() {
    let conn = open_db_in_memory().unwrap();
    let (_, employee) = seed(&conn);
    let service = EvaluationService::new(SqliteReviewRepository::try_new(&conn).unwrap());

    let err = service
        .create_goal(employee.id(), &GoalDraft::new("   ", []))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyField("description"))
    ));
    assert!(service.goals(employee.id()).unwrap().is_empty());
}

#[test]
fn goals_list_newest_first_with_competencies_by_name() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn);
    let service = EvaluationService::new(SqliteReviewRepository::try_new(&conn).unwrap());
    let ids: Vec<CompetencyId> = profile.competencies.iter().map(|c| c.id).collect();

    service
        .create_goal(employee.id(), &GoalDraft::new("First goal", [ids[0]]))
        .unwrap();
    service
        .create_goal(employee.id(), &GoalDraft::new("Second goal", ids.clone()))
        .unwrap();

    let goals = service.goals(employee.id()).unwrap();
    assert_eq!(goals[0].goal.description, "Second goal");
    assert_eq!(goals[1].goal.description, "First goal");
    let linked: Vec<&str> = goals[0]
        .competencies
        .iter()
        .map(|competency| competency.name.as_str())
        .collect();
    assert_eq!(linked, vec!["Architecture", "Budgeting", "Collaboration"]);
}

#[test]
fn deleting_goal_removes_its_links_only() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn);
    let service = EvaluationService::new(SqliteReviewRepository::try_new(&conn).unwrap());
    let a = profile.competencies[0].id;

    let doomed = service
        .create_goal(employee.id(), &GoalDraft::new("Old goal", [a]))
        .unwrap();
    let kept = service
        .create_goal(employee.id(), &GoalDraft::new("New goal", [a]))
        .unwrap();

    service.delete_goal(doomed.goal.id).unwrap();

    let goals = service.goals(employee.id()).unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].goal.id, kept.goal.id);
    assert_eq!(link_row_ids(&conn, a).len(), 1);
    assert!(matches!(
        service.delete_goal(doomed.goal.id).unwrap_err(),
        ServiceError::NotFound { entity: "goal", .. }
    ));
}

#[test]
fn goals_view_offers_profile_competencies_by_name_and_refetches() {
    let conn = open_db_in_memory().unwrap();
    let (profile, employee) = seed(&conn);
    let service = EvaluationService::new(SqliteReviewRepository::try_new(&conn).unwrap());

    let mut view = GoalsView::load(&service, employee);
    let available: Vec<&str> = view
        .available_competencies()
        .iter()
        .map(|competency| competency.name.as_str())
        .collect();
    assert_eq!(available, vec!["Architecture", "Budgeting", "Collaboration"]);

    let mut form = GoalDraft::new("Own the roadmap", []);
    form.toggle_competency(profile.competencies[1].id);
    let goal_id = view.create(&service, &form).unwrap();
    assert_eq!(view.goals().len(), 1);

    let mut edit = view.edit_form(goal_id).unwrap();
    edit.toggle_competency(profile.competencies[1].id);
    edit.toggle_competency(profile.competencies[2].id);
    view.update(&service, goal_id, &edit).unwrap();
    assert_eq!(
        view.goals()[0].competency_ids(),
        BTreeSet::from([profile.competencies[2].id])
    );

    view.delete(&service, goal_id).unwrap();
    assert!(view.goals().is_empty());
}

#[test]
fn unassigned_employee_has_no_linkable_competencies() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let employee = EmployeeService::new(repo)
        .create_employee(&EmployeeDraft::new("Jane Doe", "Engineer", None))
        .unwrap();
    let service = EvaluationService::new(repo);

    let view = GoalsView::load(&service, employee);
    assert!(view.available_competencies().is_empty());
    assert!(!view.is_stale());
}
