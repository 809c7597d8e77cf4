use ash::vk::{ShaderModuleCreateInfo, ShaderStageFlags};
use log::{info, warn};

use super::{
    device::Device,
    error::{RendererError, Result, VkResultExt},
};

pub const SPHERE_VERTEX_SOURCE: &str = include_str!("shaders/sphere.vert");
pub const SPHERE_FRAGMENT_SOURCE: &str = include_str!("shaders/sphere.frag");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }

    pub fn flags(self) -> ShaderStageFlags {
        match self {
            ShaderStage::Vertex => ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => ShaderStageFlags::FRAGMENT,
        }
    }

    fn kind(self) -> shaderc::ShaderKind {
        match self {
            ShaderStage::Vertex => shaderc::ShaderKind::Vertex,
            ShaderStage::Fragment => shaderc::ShaderKind::Fragment,
        }
    }
}

/// GLSL to SPIR-V, targeting the same Vulkan version as the instance.
pub struct ShaderCompiler {
    compiler: shaderc::Compiler,
    options: shaderc::CompileOptions<'static>,
}

impl ShaderCompiler {
    pub fn new() -> Result<Self> {
        let compiler = shaderc::Compiler::new().ok_or(RendererError::ShaderCompilerUnavailable)?;
        let mut options =
            shaderc::CompileOptions::new().ok_or(RendererError::ShaderCompilerUnavailable)?;
        options.set_target_env(
            shaderc::TargetEnv::Vulkan,
            shaderc::EnvVersion::Vulkan1_2 as u32,
        );
        options.set_optimization_level(shaderc::OptimizationLevel::Performance);
        if cfg!(debug_assertions) {
            options.set_generate_debug_info();
        }

        Ok(Self { compiler, options })
    }

    pub fn compile(&self, stage: ShaderStage, source: &str, file_name: &str) -> Result<Vec<u32>> {
        let artifact = self
            .compiler
            .compile_into_spirv(source, stage.kind(), file_name, "main", Some(&self.options))
            .map_err(|e| RendererError::ShaderCompilation {
                stage: stage.name(),
                log: e.to_string(),
            })?;

        if artifact.get_num_warnings() > 0 {
            warn!(
                "{} shader {}: {}",
                stage.name(),
                file_name,
                artifact.get_warning_messages()
            );
        }
        info!(
            "Compiled {} shader {} ({} words)",
            stage.name(),
            file_name,
            artifact.as_binary().len()
        );

        Ok(artifact.as_binary().to_vec())
    }
}

pub struct ShaderModule {
    pub inner: ash::vk::ShaderModule,
    pub stage: ShaderStage,
    device: ash::Device,
}

impl ShaderModule {
    pub fn new(device: &Device, stage: ShaderStage, code: &[u32]) -> Result<Self> {
        let create_info = ShaderModuleCreateInfo::builder().code(code);

        let inner = unsafe {
            device
                .inner
                .create_shader_module(&create_info, None)
                .during("vkCreateShaderModule")?
        };

        Ok(ShaderModule {
            inner,
            stage,
            device: device.inner.clone(),
        })
    }

    pub fn compile(
        device: &Device,
        compiler: &ShaderCompiler,
        stage: ShaderStage,
        source: &str,
        file_name: &str,
    ) -> Result<Self> {
        let code = compiler.compile(stage, source, file_name)?;
        ShaderModule::new(device, stage, &code)
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.inner, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPIRV_MAGIC: u32 = 0x0723_0203;

    #[test]
    fn sphere_shaders_compile() {
        let compiler = ShaderCompiler::new().unwrap();

        let vert = compiler
            .compile(ShaderStage::Vertex, SPHERE_VERTEX_SOURCE, "sphere.vert")
            .unwrap();
        let frag = compiler
            .compile(ShaderStage::Fragment, SPHERE_FRAGMENT_SOURCE, "sphere.frag")
            .unwrap();

        assert_eq!(vert[0], SPIRV_MAGIC);
        assert_eq!(frag[0], SPIRV_MAGIC);
    }

    #[test]
    fn vertex_stage_applies_all_three_matrices() {
        let source = SPHERE_VERTEX_SOURCE;

        assert!(source.contains("scene.projection * scene.view * scene.model"));
        assert!(source.contains("layout(location = 0) in vec3 position"));
    }

    #[test]
    fn broken_source_reports_stage_and_log() {
        let compiler = ShaderCompiler::new().unwrap();
        let err = compiler
            .compile(
                ShaderStage::Fragment,
                "#version 450\nvoid main() { undeclared = 1.0; }\n",
                "broken.frag",
            )
            .unwrap_err();

        match err {
            RendererError::ShaderCompilation { stage, log } => {
                assert_eq!(stage, "fragment");
                assert!(log.contains("undeclared"), "unexpected log: {}", log);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
