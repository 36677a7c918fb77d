//! Configuration validation integration tests
//!
//! Exercises the documented validation scenarios end to end: scheme
//! selection, hierarchy and weight rules, constraint cross-references,
//! and the report-everything-at-once contract.

mod common;

use common::{
    categorical, chimera, chimera_pair_config, config, continuous, objective,
    single_objective_config, weighted,
};
use optloop::domain::error::Rule;
use optloop::domain::models::{
    CategoryDescriptor, Constraint, ExclusionConstraint, ExclusionTerm, Interval,
    LinearConstraint, LinearTerm, MultiObjectiveFunction, ObjectiveGoal, Parameter, ParameterKind,
};
use optloop::domain::validate::validate;

fn annotated(category: &str, properties: &[(&str, f64)]) -> CategoryDescriptor {
    CategoryDescriptor {
        category: category.to_string(),
        properties: Some(
            properties
                .iter()
                .map(|(key, value)| ((*key).to_string(), *value))
                .collect(),
        ),
    }
}

fn solvent_parameter(options: Vec<CategoryDescriptor>) -> Parameter {
    Parameter {
        name: "solvent".to_string(),
        kind: ParameterKind::Categorical { options },
        description: None,
    }
}

#[test]
fn single_objective_needs_no_scheme() {
    let validated = validate(single_objective_config(20, 1)).unwrap();
    assert!(!validated.is_multi_objective());
    assert!(validated.normalized_weights().is_none());
}

#[test]
fn chimera_hierarchy_scenario_validates() {
    let validated = validate(chimera_pair_config()).unwrap();

    assert!(validated.is_multi_objective());
    assert_eq!(
        validated.objective_names().collect::<Vec<_>>(),
        vec!["conductivity", "toxicity"]
    );
}

#[test]
fn duplicate_hierarchy_rank_names_both_objectives() {
    let mut cfg = chimera_pair_config();
    cfg.objectives = vec![
        chimera("conductivity", ObjectiveGoal::Max, 0, Some(10.0), None),
        chimera("toxicity", ObjectiveGoal::Min, 0, Some(0.0), None),
    ];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::HierarchyRankDuplicate));
    let violation = err
        .violations()
        .iter()
        .find(|v| v.rule == Rule::HierarchyRankDuplicate)
        .unwrap();
    assert!(violation.message.contains("conductivity"));
    assert!(violation.message.contains("toxicity"));
}

#[test]
fn hierarchy_ranks_must_be_contiguous_from_zero() {
    let mut cfg = chimera_pair_config();
    cfg.objectives = vec![
        chimera("conductivity", ObjectiveGoal::Max, 0, Some(10.0), None),
        chimera("toxicity", ObjectiveGoal::Min, 2, Some(0.0), None),
    ];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::HierarchyRankGap));
}

#[test]
fn non_terminal_hierarchy_entry_requires_a_tolerance() {
    let mut cfg = chimera_pair_config();
    cfg.objectives = vec![
        chimera("conductivity", ObjectiveGoal::Max, 0, None, None),
        chimera("toxicity", ObjectiveGoal::Min, 1, Some(0.0), None),
    ];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::HierarchyToleranceMissing));
    assert_eq!(
        err.violations()[0].path,
        "objectives[0].multi_objective"
    );
}

#[test]
fn terminal_hierarchy_entry_must_not_tolerate_degradation() {
    let mut cfg = chimera_pair_config();
    cfg.objectives = vec![
        chimera("conductivity", ObjectiveGoal::Max, 0, Some(10.0), None),
        chimera("toxicity", ObjectiveGoal::Min, 1, Some(5.0), None),
    ];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::HierarchyTerminalTolerance));
}

#[test]
fn hierarchy_entry_cannot_carry_both_tolerance_shapes() {
    let mut cfg = chimera_pair_config();
    cfg.objectives = vec![
        chimera("conductivity", ObjectiveGoal::Max, 0, Some(10.0), Some(0.5)),
        chimera("toxicity", ObjectiveGoal::Min, 1, Some(0.0), None),
    ];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::HierarchyToleranceRange));
}

#[test]
fn relative_tolerance_is_a_percentage() {
    let mut cfg = chimera_pair_config();
    cfg.objectives = vec![
        chimera("conductivity", ObjectiveGoal::Max, 0, Some(250.0), None),
        chimera("toxicity", ObjectiveGoal::Min, 1, Some(0.0), None),
    ];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::HierarchyToleranceRange));
}

#[test]
fn weighted_sum_rejects_negative_weights() {
    let mut cfg = config(
        vec![continuous("param_a", 0.0, 10.0)],
        vec![
            weighted("conductivity", ObjectiveGoal::Max, 2.0),
            weighted("toxicity", ObjectiveGoal::Min, -1.0),
        ],
    );
    cfg.multi_objective_function = Some(MultiObjectiveFunction::WeightedSum);

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::WeightNegative));
}

#[test]
fn weighted_sum_rejects_all_zero_weights() {
    let mut cfg = config(
        vec![continuous("param_a", 0.0, 10.0)],
        vec![
            weighted("conductivity", ObjectiveGoal::Max, 0.0),
            weighted("toxicity", ObjectiveGoal::Min, 0.0),
        ],
    );
    cfg.multi_objective_function = Some(MultiObjectiveFunction::WeightedSum);

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::WeightAllZero));
}

#[test]
fn several_objectives_require_a_scheme() {
    let cfg = config(
        vec![continuous("param_a", 0.0, 10.0)],
        vec![
            objective("conductivity", ObjectiveGoal::Max),
            objective("toxicity", ObjectiveGoal::Min),
        ],
    );

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::MofMissing));
}

#[test]
fn scheme_and_entries_must_agree() {
    let mut cfg = config(
        vec![continuous("param_a", 0.0, 10.0)],
        vec![
            weighted("conductivity", ObjectiveGoal::Max, 1.0),
            weighted("toxicity", ObjectiveGoal::Min, 1.0),
        ],
    );
    cfg.multi_objective_function = Some(MultiObjectiveFunction::Chimera);

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::MofSchemeMismatch));
    assert_eq!(err.violations().len(), 2);
}

#[test]
fn target_goal_and_target_value_must_agree() {
    let mut with_goal_no_value = single_objective_config(20, 1);
    with_goal_no_value.objectives[0].goal = ObjectiveGoal::Target;
    let err = validate(with_goal_no_value).unwrap_err();
    assert!(err.contains_rule(Rule::ObjectiveTargetGoal));

    let mut with_value_wrong_goal = single_objective_config(20, 1);
    with_value_wrong_goal.objectives[0].target = Some(0.9);
    let err = validate(with_value_wrong_goal).unwrap_err();
    assert!(err.contains_rule(Rule::ObjectiveTargetGoal));

    let mut agreeing = single_objective_config(20, 1);
    agreeing.objectives[0].goal = ObjectiveGoal::Target;
    agreeing.objectives[0].target = Some(0.9);
    assert!(validate(agreeing).is_ok());
}

#[test]
fn blank_parameter_and_objective_names_are_rejected() {
    let mut cfg = single_objective_config(20, 1);
    cfg.parameters[0].name = "  ".to_string();
    cfg.objectives[0].name = String::new();

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ParameterEmptyName));
    assert!(err.contains_rule(Rule::ObjectiveEmptyName));
    assert_eq!(err.violations().len(), 2);
}

#[test]
fn duplicate_objective_names_are_rejected() {
    let mut cfg = chimera_pair_config();
    cfg.objectives[1].name = "conductivity".to_string();

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ObjectiveDuplicateName));
    let violation = &err.violations()[0];
    assert_eq!(violation.path, "objectives[1].name");
    assert!(violation.message.contains("objectives[0]"));
}

#[test]
fn constraint_referencing_unknown_parameter_fails() {
    let mut cfg = chimera_pair_config();
    cfg.constraints = vec![Constraint::LinearLte(LinearConstraint {
        name: None,
        terms: vec![LinearTerm {
            parameter: "param_c".to_string(),
            weight: 1.0,
        }],
        targets: vec![5.0],
    })];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ConstraintUnknownParameter));
    let violation = &err.violations()[0];
    assert!(violation.message.contains("param_c"));
    assert_eq!(violation.path, "constraints[0].terms[0].parameter");
}

#[test]
fn linear_between_requires_ordered_target_pair() {
    let mut cfg = single_objective_config(20, 1);
    cfg.constraints = vec![Constraint::LinearBetween(LinearConstraint {
        name: Some("window".to_string()),
        terms: vec![LinearTerm {
            parameter: "param_a".to_string(),
            weight: 1.0,
        }],
        targets: vec![0.9, 0.2],
    })];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ConstraintIntervalOrder));
}

#[test]
fn linear_eq_requires_exactly_one_target() {
    let mut cfg = single_objective_config(20, 1);
    cfg.constraints = vec![Constraint::LinearEq(LinearConstraint {
        name: None,
        terms: vec![LinearTerm {
            parameter: "param_a".to_string(),
            weight: 1.0,
        }],
        targets: vec![0.5, 0.7],
    })];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ConstraintTargetCount));
}

#[test]
fn linear_targets_must_be_finite() {
    let mut cfg = single_objective_config(20, 1);
    cfg.constraints = vec![Constraint::LinearGte(LinearConstraint {
        name: None,
        terms: vec![LinearTerm {
            parameter: "param_a".to_string(),
            weight: 1.0,
        }],
        targets: vec![f64::NAN],
    })];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ConstraintTargetCount));
    let violation = &err.violations()[0];
    assert_eq!(violation.path, "constraints[0].targets");
    assert!(violation.message.contains("finite"));
}

#[test]
fn conditional_exclusion_needs_condition_and_consequence() {
    let mut cfg = single_objective_config(20, 1);
    cfg.constraints = vec![Constraint::ConditionalExclusion(ExclusionConstraint {
        name: None,
        terms: vec![ExclusionTerm {
            parameter: "param_a".to_string(),
            bounds: vec![Interval::from((0.2, 0.4))],
        }],
    })];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ConstraintConditionShape));
}

#[test]
fn exclusion_intervals_must_be_ordered() {
    let mut cfg = single_objective_config(20, 1);
    cfg.constraints = vec![Constraint::Exclusion(ExclusionConstraint {
        name: None,
        terms: vec![ExclusionTerm {
            parameter: "param_b".to_string(),
            bounds: vec![Interval::from((4.0, 1.0))],
        }],
    })];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ConstraintIntervalOrder));
}

#[test]
fn well_formed_constraints_pass() {
    let mut cfg = chimera_pair_config();
    cfg.constraints = vec![
        Constraint::LinearBetween(LinearConstraint {
            name: Some("mix".to_string()),
            terms: vec![
                LinearTerm {
                    parameter: "param_a".to_string(),
                    weight: 1.0,
                },
                LinearTerm {
                    parameter: "param_b".to_string(),
                    weight: 1.0,
                },
            ],
            targets: vec![2.0, 8.0],
        }),
        Constraint::Exclusion(ExclusionConstraint {
            name: None,
            terms: vec![ExclusionTerm {
                parameter: "param_a".to_string(),
                bounds: vec![Interval::from((4.5, 5.5))],
            }],
        }),
    ];

    assert!(validate(cfg).is_ok());
}

#[test]
fn duplicate_categories_are_rejected() {
    let cfg = config(
        vec![categorical("solvent", &["thf", "toluene", "thf"])],
        vec![objective("conversion", ObjectiveGoal::Max)],
    );

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ParameterDuplicateCategory));
}

#[test]
fn categorical_parameters_need_at_least_one_option() {
    let cfg = config(
        vec![solvent_parameter(Vec::new())],
        vec![objective("conversion", ObjectiveGoal::Max)],
    );

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ParameterNoOptions));
    assert_eq!(err.violations()[0].path, "parameters[0].options");
}

#[test]
fn descriptor_properties_must_cover_every_option() {
    let cfg = config(
        vec![solvent_parameter(vec![
            annotated("thf", &[("polarity", 4.0)]),
            CategoryDescriptor::new("toluene"),
        ])],
        vec![objective("conversion", ObjectiveGoal::Max)],
    );

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ParameterDescriptorKeys));
    let violation = &err.violations()[0];
    assert_eq!(violation.path, "parameters[0].options[1].properties");
    assert!(violation.message.contains("toluene"));
    assert!(violation.message.contains("thf"));
}

#[test]
fn descriptor_properties_must_share_one_key_set() {
    let cfg = config(
        vec![solvent_parameter(vec![
            annotated("thf", &[("boiling_point", 66.0), ("polarity", 4.0)]),
            annotated("toluene", &[("polarity", 2.4)]),
        ])],
        vec![objective("conversion", ObjectiveGoal::Max)],
    );

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ParameterDescriptorKeys));
    assert_eq!(
        err.violations()[0].path,
        "parameters[0].options[1].properties"
    );
}

#[test]
fn unrelated_violations_come_back_in_one_error() {
    let mut cfg = chimera_pair_config();
    cfg.name = "  ".to_string();
    cfg.batch_size = 0;
    cfg.objectives[1] = chimera("toxicity", ObjectiveGoal::Min, 0, Some(0.0), None);
    cfg.constraints = vec![Constraint::LinearEq(LinearConstraint {
        name: None,
        terms: vec![],
        targets: vec![1.0],
    })];

    let err = validate(cfg).unwrap_err();
    assert!(err.contains_rule(Rule::ConfigEmptyName));
    assert!(err.contains_rule(Rule::BatchSize));
    assert!(err.contains_rule(Rule::HierarchyRankDuplicate));
    assert!(err.contains_rule(Rule::ConstraintEmptyTerms));
    assert!(err.violations().len() >= 4);
}
