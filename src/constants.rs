// WINDOW
pub const WINDOW_TITLE: &str = "Wireframe Sphere";
pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;

// SPHERE
pub const SPHERE_STACKS: u32 = 30;
pub const SPHERE_SLICES: u32 = 30;
pub const SPHERE_RADIUS: f32 = 2.0;

// SCENE
pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.0];
pub const EYE_POSITION: [f32; 3] = [0.0, 0.0, 5.0];
pub const FIELD_OF_VIEW_DEGREES: f32 = 45.0;
pub const NEAR_PLANE: f32 = 1.0;
pub const FAR_PLANE: f32 = 100.0;
pub const ROTATION_AXIS: [f32; 3] = [1.0, 0.3, 0.5];
pub const ROTATION_DEGREES_PER_SECOND: f32 = 50.0;
/// World units the sphere moves per accumulated W/A/S/D/Q/E step.
pub const OFFSET_STEP: f32 = 0.05;
