use perfreview_core::db::open_store;
use perfreview_core::model::profile::CompetencyDraft;
use perfreview_core::view::{
    CompetenciesView, EmployeesView, EvaluationBody, EvaluationPanel, GoalsView, NotesView,
    ProfilesView,
};
use perfreview_core::{
    AccessDecision, AccessPolicy, AppConfig, AppTab, CompetencySheet, EmployeeDraft,
    EmployeeService, EvaluationService, EvaluationView, GoalDraft, Identity, ProfileDraft,
    ProfileService, Selection, SqliteReviewRepository,
};

#[test]
fn reviewer_rates_an_employee_end_to_end() {
    let config = AppConfig::from_json_str(
        &serde_json::json!({
            "store_url": ":memory:",
            "store_key": "acme-reviews",
            "allowed_emails": ["Lead@Example.com"]
        })
        .to_string(),
    )
    .unwrap();

    let policy = AccessPolicy::new(config.allowed_emails.iter());
    assert_eq!(policy.evaluate(None), AccessDecision::SignedOut);
    assert!(matches!(
        policy.evaluate(Some(&Identity::with_email("intruder@example.com"))),
        AccessDecision::Denied { message } if message.ends_with("Signed in as: intruder@example.com")
    ));
    assert_eq!(
        policy.evaluate(Some(&Identity::with_email("lead@example.com"))),
        AccessDecision::Allowed
    );

    let conn = open_store(&config.store).unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let profiles = ProfileService::new(repo);
    let employees = EmployeeService::new(repo);
    let evaluation = EvaluationService::new(repo);
    let mut selection = Selection::new();

    let mut profiles_view = ProfilesView::load(&profiles);
    let mut form = ProfileDraft::default();
    form.name = "Senior Engineer".to_string();
    form.competencies[0] = CompetencyDraft::new("Code Quality", "Readable, tested code");
    let profile_id = profiles_view.create(&profiles, &form).unwrap();
    let code_quality = profiles_view.find(profile_id).unwrap().competencies[0].id;

    let mut employees_view = EmployeesView::load(&employees);
    assert_eq!(employees_view.assignable_profiles().len(), 1);
    let jane = employees_view
        .create(
            &employees,
            &EmployeeDraft::new("Jane Doe", "Software Engineer", Some(profile_id)),
        )
        .unwrap();
    assert!(employees_view.select(jane, &mut selection));
    assert_eq!(selection.active_tab(), AppTab::Evaluate);

    let mut panel =
        EvaluationPanel::for_selection(&evaluation, &selection, &employees_view).unwrap();
    assert_eq!(panel.header().name, "Jane Doe");
    assert_eq!(panel.header().initials, "JD");
    assert_eq!(panel.header().profile_label, "Senior Engineer");

    let mut competencies = CompetenciesView::load(&evaluation, panel.employee().clone());
    competencies.rate(&evaluation, code_quality, 8).unwrap();
    let Some(CompetencySheet::Ready(rows)) = competencies.sheet() else {
        panic!("expected rated competencies");
    };
    assert_eq!(rows[0].competency.name, "Code Quality");
    assert_eq!(rows[0].rating_label(), "8/10");

    let mut notes = NotesView::load(&evaluation, panel.employee().clone());
    notes.save(&evaluation, "Raised the bar on reviews.").unwrap();
    let mut goals = GoalsView::load(&evaluation, panel.employee().clone());
    goals
        .create(
            &evaluation,
            &GoalDraft::new("Introduce property tests", [code_quality]),
        )
        .unwrap();

    assert!(panel.switch_view(&evaluation, &mut selection, EvaluationView::Notes));
    let EvaluationBody::Notes(notes) = panel.body() else {
        panic!("expected notes view");
    };
    assert_eq!(notes.content(), "Raised the bar on reviews.");

    assert!(panel.switch_view(&evaluation, &mut selection, EvaluationView::Goals));
    let EvaluationBody::Goals(goals) = panel.body() else {
        panic!("expected goals view");
    };
    assert_eq!(goals.goals()[0].competencies[0].name, "Code Quality");

    assert!(panel.switch_view(&evaluation, &mut selection, EvaluationView::Competencies));
    assert!(matches!(
        panel.body(),
        EvaluationBody::Competencies(view) if view.sheet() == competencies.sheet()
    ));

    employees_view
        .delete(&employees, jane, &mut selection)
        .unwrap();
    assert_eq!(selection.active_tab(), AppTab::Employees);
    assert!(EvaluationPanel::for_selection(&evaluation, &selection, &employees_view).is_none());

    profiles_view.refresh(&profiles).unwrap();
    assert_eq!(profiles_view.profiles().len(), 1);
}

#[test]
fn switching_sub_view_outside_evaluate_is_rejected() {
    let config = AppConfig::from_json_str(
        r#"{"store_url": ":memory:", "store_key": "k", "allowed_emails": ["a@b.co"]}"#,
    )
    .unwrap();
    let conn = open_store(&config.store).unwrap();
    let repo = SqliteReviewRepository::try_new(&conn).unwrap();
    let employees = EmployeeService::new(repo);
    let evaluation = EvaluationService::new(repo);
    let mut selection = Selection::new();

    let mut view = EmployeesView::load(&employees);
    let id = view
        .create(&employees, &EmployeeDraft::new("Ana Ruiz", "Analyst", None))
        .unwrap();
    view.select(id, &mut selection);
    let mut panel = EvaluationPanel::for_selection(&evaluation, &selection, &view).unwrap();
    let EvaluationBody::Competencies(competencies) = panel.body() else {
        panic!("evaluate opens on competencies");
    };
    assert_eq!(competencies.sheet(), Some(&CompetencySheet::NoProfileAssigned));

    assert!(selection.set_tab(AppTab::Profiles));
    assert!(!panel.switch_view(&evaluation, &mut selection, EvaluationView::Goals));
    assert_eq!(panel.body().view(), EvaluationView::Competencies);
}
