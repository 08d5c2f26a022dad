use glam::Vec3;
use crate::log::NullLogger;
use crate::renderer::mock_render_device::{CaptureLogger, MockEffect, MockRenderDevice};
use crate::renderer::{Effect, GeometryData};
use crate::scene::test_object::{camera_looking_at, material, TestObject};
use crate::scene::{OctreeSceneManager, OctreeSceneManagerConfig, SceneManager};
use crate::procedure::ScenePass;
use crate::script::{SceneInstruction, SceneVariable, SceneVariableValue};
use super::*;

fn procedure(name: &str, effect: Option<Arc<dyn Effect>>, pass_camera: usize) -> SceneProcedure {
    SceneProcedure::new(name,
        vec![SceneVariable::new("fx", SceneVariableValue::Effect(effect))],
        vec![ScenePass::new(name, -1, pass_camera, vec![SceneInstruction::Render], Arc::new(NullLogger))],
        Arc::new(NullLogger))
}

fn effect() -> Option<Arc<dyn Effect>> {
    Some(Arc::new(MockEffect::new("fx", &[])))
}

fn scene() -> OctreeSceneManager {
    let mut scene = OctreeSceneManager::new(OctreeSceneManagerConfig::default(), Arc::new(NullLogger));
    let opaque = material("opaque", u64::MAX);
    let geometry = Arc::new(GeometryData::new(3, 1));
    // In front of camera 0 only
    scene.add_object(TestObject::new(Vec3::new(0.0, 0.0, -20.0), 1.0).drawing(&opaque, &geometry).boxed());
    scene
}

fn cameras() -> Vec<Camera> {
    vec![
        camera_looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)),
        camera_looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)),
    ]
}

#[test]
fn test_first_available_procedure_is_selected() {
    let mut renderer = SceneRenderer::new(Arc::new(NullLogger));
    renderer.add_procedure(procedure("high", None, 0));
    renderer.add_procedure(procedure("low", effect(), 0));
    renderer.add_procedure(procedure("lowest", effect(), 0));
    let mut batch = BatchData::default();

    assert_eq!(renderer.select_procedure(&mut batch), Some(1));
    assert_eq!(renderer.selected_procedure().map(SceneProcedure::name), Some("low"));
}

#[test]
fn test_selection_follows_availability() {
    let logger = CaptureLogger::new();
    let mut renderer = SceneRenderer::new(logger.clone());
    renderer.add_procedure(procedure("high", None, 0));
    renderer.add_procedure(procedure("low", effect(), 0));
    let mut batch = BatchData::default();

    renderer.select_procedure(&mut batch);
    renderer.select_procedure(&mut batch);
    let infos = logger.messages(crate::log::LogSeverity::Info);
    assert_eq!(infos.len(), 1);

    renderer.procedure_mut(0).unwrap()
        .variable_mut("fx").unwrap()
        .set_value(SceneVariableValue::Effect(effect()));
    assert_eq!(renderer.select_procedure(&mut batch), Some(0));
    assert_eq!(logger.messages(crate::log::LogSeverity::Info).len(), 2);
}

#[test]
fn test_selection_change_resets_batch() {
    let mut renderer = SceneRenderer::new(Arc::new(NullLogger));
    renderer.add_procedure(procedure("high", None, 0));
    renderer.add_procedure(procedure("low", effect(), 0));
    let mut scene = scene();
    let cameras = cameras();
    let mut batch = BatchData::default();
    let mut device = MockRenderDevice::new();

    renderer.render_scene(&cameras, &mut scene, &mut batch, &mut device).unwrap();
    assert_eq!(batch.material_count(), 1);

    renderer.procedure_mut(0).unwrap()
        .variable_mut("fx").unwrap()
        .set_value(SceneVariableValue::Effect(effect()));
    renderer.select_procedure(&mut batch);
    assert_eq!(batch.material_count(), 0);
}

#[test]
fn test_no_available_procedure_warns_once() {
    let logger = CaptureLogger::new();
    let mut renderer = SceneRenderer::new(logger.clone());
    renderer.add_procedure(procedure("only", None, 0));
    let mut scene = scene();
    let cameras = cameras();
    let mut batch = BatchData::default();
    let mut device = MockRenderDevice::new();

    for _ in 0..3 {
        renderer.render_scene(&cameras, &mut scene, &mut batch, &mut device).unwrap();
    }

    assert!(device.commands.is_empty());
    assert_eq!(renderer.selected_index(), None);
    assert_eq!(logger.warnings().len(), 1);
}

#[test]
fn test_camera_override_applies_to_every_pass() {
    let mut renderer = SceneRenderer::new(Arc::new(NullLogger));
    renderer.add_procedure(procedure("main", effect(), 0));
    let mut scene = scene();
    let cameras = cameras();
    let mut batch = BatchData::default();

    let mut front = MockRenderDevice::new();
    renderer.render_scene(&cameras, &mut scene, &mut batch, &mut front).unwrap();
    assert_eq!(front.rendered_operation_count(), 1);

    renderer.set_camera_override(Some(1));
    let mut back = MockRenderDevice::new();
    renderer.render_scene(&cameras, &mut scene, &mut batch, &mut back).unwrap();
    assert_eq!(back.rendered_operation_count(), 0);
    assert_eq!(renderer.selected_procedure().and_then(SceneProcedure::last_camera), Some(1));
}
