//! Built-in Cinemachine 2.x -> 3.x rename vocabulary.

use super::types::{MethodRenameRule, NamespaceRenameRule, TokenRenameRule, TypeRenameRule};

const KNOWN_TYPES: &[&str] = &[
    "CinemachineVirtualCamera",
    "CinemachineFreeLook",
    "CinemachinePath",
    "CinemachineSmoothPath",
    "CinemachineDollyCart",
    "CinemachineTransposer",
    "CinemachineOrbitalTransposer",
    "CinemachineFramingTransposer",
    "CinemachineComposer",
    "CinemachinePOV",
    "CinemachineTrackedDolly",
    "CinemachineGroupComposer",
    "CinemachineCollider",
    "CinemachineConfiner",
    "Cinemachine3rdPersonFollow",
    "Cinemachine3rdPersonAim",
    "CinemachineBlendListCamera",
    "CinemachineBrain",
    "CinemachineExternalCamera",
    "CinemachineFollowZoom",
    "CinemachineHardLockToTarget",
    "CinemachineHardLookAt",
    "CinemachineOrbitalFollow",
    "CinemachinePipeline",
    "CinemachineSameAsFollowTarget",
    "CinemachineSplineCart",
    "CinemachineStoryboard",
    "CinemachineTargetGroup",
    "CinemachinePixelPerfect",
    "CinemachineMixingCamera",
    "CinemachineRecomposer",
    "CinemachineClearShot",
    "CinemachineStateDriver",
    "CinemachineBrain.UpdateMethod",
    "CinemachineBlendDefinition.Style",
];

const TYPE_RENAMES: &[(&str, &str)] = &[
    ("CinemachineVirtualCamera", "CinemachineCamera"),
    ("CinemachineFreeLook", "CinemachineCamera"),
    ("CinemachinePath", "SplineContainer"),
    ("CinemachineSmoothPath", "SplineContainer"),
    ("CinemachineDollyCart", "CinemachineSplineCart"),
    ("CinemachineTransposer", "CinemachineFollow"),
    ("CinemachineOrbitalTransposer", "CinemachineOrbitalFollow"),
    ("CinemachineFramingTransposer", "CinemachinePositionComposer"),
    ("CinemachineComposer", "CinemachineRotationComposer"),
    ("CinemachinePOV", "CinemachinePanTilt"),
    ("CinemachineTrackedDolly", "CinemachineSplineDolly"),
    ("CinemachineGroupComposer", "CinemachineGroupFraming"),
    ("CinemachineCollider", "CinemachineDeoccluder"),
    ("CinemachineConfiner", "CinemachineConfiner3D"),
    ("Cinemachine3rdPersonFollow", "CinemachineThirdPersonFollow"),
    ("Cinemachine3rdPersonAim", "CinemachineThirdPersonAim"),
    ("CinemachineBlendListCamera", "CinemachineSequencerCamera"),
    ("CinemachineBrain.UpdateMethod", "CinemachineBrain.UpdateMethods"),
    ("CinemachineBlendDefinition.Style", "CinemachineBlendDefinition.Styles"),
];

pub fn known_types() -> Vec<String> {
    KNOWN_TYPES.iter().map(|name| name.to_string()).collect()
}

pub fn type_renames() -> Vec<TypeRenameRule> {
    TYPE_RENAMES
        .iter()
        .map(|(old, new)| {
            let rule = TypeRenameRule::new(*old, *new);
            // The dolly cart's position moved onto the spline.
            if *old == "CinemachineDollyCart" {
                rule.with_field("Position", "SplinePosition")
            } else {
                rule
            }
        })
        .collect()
}

pub fn namespace_renames() -> Vec<NamespaceRenameRule> {
    vec![
        TokenRenameRule::new("using Cinemachine;", "using Unity.Cinemachine;"),
        TokenRenameRule::new("using Cinemachine.Editor;", "using Unity.Cinemachine.Editor;"),
        TokenRenameRule::new("using Cinemachine.Utility;", "using Unity.Cinemachine;"),
    ]
}

pub fn method_renames() -> Vec<MethodRenameRule> {
    vec![
        TokenRenameRule::new("SimpleFollowWithWorldUp", "LazyFollow"),
        TokenRenameRule::new("GetCinemachineComponent", "GetComponent"),
    ]
}
