use crate::driver::{Driver, ShaderStage};

/// Creates and compiles one shader.
///
/// On failure the diagnostic is logged, the object is deleted and `None` is
/// returned.
pub fn compile_shader<D: Driver>(driver: &mut D, stage: ShaderStage, source: &str) -> Option<D::Shader> {
    let Some(mut shader) = driver.create_shader(stage) else {
        log::error!("could not create {stage} shader object");
        return None;
    };

    if !driver.compile_shader(&mut shader, source) {
        log::error!("could not compile {stage} shader:\n{}", driver.shader_info_log(&shader));
        driver.delete_shader(shader);
        return None;
    }
    Some(shader)
}

/// Compiles both stages and links them into a program.
///
/// Returns `None` without leaking anything when either stage fails to
/// compile or the link fails. On success the shaders stay attached to the
/// returned program.
pub fn link_program<D: Driver>(driver: &mut D, vertex_src: &str, fragment_src: &str) -> Option<D::Program> {
    let vertex = compile_shader(driver, ShaderStage::Vertex, vertex_src)?;
    let Some(fragment) = compile_shader(driver, ShaderStage::Fragment, fragment_src) else {
        driver.delete_shader(vertex);
        return None;
    };

    let Some(mut program) = driver.create_program() else {
        log::error!("could not create program object");
        driver.delete_shader(vertex);
        driver.delete_shader(fragment);
        return None;
    };

    driver.attach_shader(&mut program, vertex);
    driver.attach_shader(&mut program, fragment);

    if !driver.link_program(&mut program) {
        log::error!("could not link program:\n{}", driver.program_info_log(&program));
        driver.delete_program(program);
        return None;
    }
    Some(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockDriver;

    const VS: &str = "vertex";
    const FS: &str = "fragment";

    #[test]
    fn compile_success_keeps_shader() {
        let mut d = MockDriver::new();
        let shader = compile_shader(&mut d, ShaderStage::Vertex, VS).unwrap();
        assert_eq!(shader.stage, ShaderStage::Vertex);
        assert_eq!(d.live_shaders.len(), 1);
    }

    #[test]
    fn compile_failure_deletes_shader() {
        let mut d = MockDriver::new();
        d.fail_compile = Some(ShaderStage::Fragment);
        assert!(compile_shader(&mut d, ShaderStage::Fragment, FS).is_none());
        assert!(d.live_shaders.is_empty());
    }

    #[test]
    fn link_success() {
        let mut d = MockDriver::new();
        let program = link_program(&mut d, VS, FS).unwrap();
        assert!(d.live_programs.contains(&program.id));
        assert_eq!(d.live_shaders.len(), 2);
    }

    #[test]
    fn vertex_failure_creates_no_program() {
        let mut d = MockDriver::new();
        d.fail_compile = Some(ShaderStage::Vertex);
        assert!(link_program(&mut d, VS, FS).is_none());
        assert!(d.live_programs.is_empty());
        assert!(d.live_shaders.is_empty());
    }

    #[test]
    fn fragment_failure_deletes_compiled_vertex() {
        let mut d = MockDriver::new();
        d.fail_compile = Some(ShaderStage::Fragment);
        assert!(link_program(&mut d, VS, FS).is_none());
        assert!(d.live_programs.is_empty());
        assert!(d.live_shaders.is_empty());
    }

    #[test]
    fn link_failure_deletes_program_and_shaders() {
        let mut d = MockDriver::new();
        d.fail_link = true;
        assert!(link_program(&mut d, VS, FS).is_none());
        assert!(d.live_programs.is_empty());
        assert!(d.live_shaders.is_empty());
    }

    #[test]
    fn program_creation_failure_releases_shaders() {
        let mut d = MockDriver::new();
        d.fail_create_program = true;
        assert!(link_program(&mut d, VS, FS).is_none());
        assert!(d.live_shaders.is_empty());
    }
}
