use metal_tutorial::app::Stage;
use metal_tutorial::core::{TextureFormat, Timer};
use metal_tutorial::math::{Mat4, Vec3, Vec4};
use metal_tutorial::renderer;
use metal_tutorial::renderer::spinning_quad_renderer;
use metal_tutorial::renderer::textured_quad_renderer;

const EPSILON: f32 = 1e-5;

#[test]
fn test_stage_ordering() {
    // The app gates device and renderer setup on checkpoint order
    assert!(Stage::Window < Stage::Device);
    assert!(Stage::Device < Stage::Triangle);
    assert!(Stage::Triangle < Stage::TexturedQuad);
    assert!(Stage::TexturedQuad < Stage::SpinningQuad);
}

#[test]
fn test_triangle_geometry() {
    let vertices = renderer::triangle_vertices();
    assert_eq!(vertices.len(), 3);

    for vertex in &vertices {
        // Positions stay inside clip space
        assert!(vertex.position.x >= -1.0 && vertex.position.x <= 1.0);
        assert!(vertex.position.y >= -1.0 && vertex.position.y <= 1.0);
        assert_eq!(vertex.position.z, 0.0);
    }

    // One pure red, one pure green, one pure blue corner
    assert_eq!(vertices[0].color, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(vertices[1].color, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(vertices[2].color, Vec3::new(0.0, 0.0, 1.0));
}

#[test]
fn test_triangle_vertex_layout() {
    // The vertex descriptor assumes a 16-byte aligned position followed
    // by the color
    assert_eq!(std::mem::size_of::<renderer::Vertex>(), 32);
    assert_eq!(std::mem::offset_of!(renderer::Vertex, color), 16);
}

#[test]
fn test_quad_geometry() {
    let vertices = textured_quad_renderer::quad_vertices();
    assert_eq!(vertices.len(), 4);

    for vertex in &vertices {
        assert!(vertex.position.x.abs() <= 0.5);
        assert!(vertex.position.y.abs() <= 0.5);
        assert!(vertex.uv.x >= 0.0 && vertex.uv.x <= 1.0);
        assert!(vertex.uv.y >= 0.0 && vertex.uv.y <= 1.0);
    }

    // Two triangles, every index referencing a real vertex
    assert_eq!(textured_quad_renderer::QUAD_INDICES.len(), 6);
    for &index in &textured_quad_renderer::QUAD_INDICES {
        assert!((index as usize) < vertices.len());
    }
}

#[test]
fn test_quad_vertex_layout() {
    assert_eq!(std::mem::size_of::<textured_quad_renderer::Vertex>(), 32);
    assert_eq!(
        std::mem::offset_of!(textured_quad_renderer::Vertex, uv),
        16
    );

    // The spinning checkpoint shares the same GPU layout
    assert_eq!(std::mem::size_of::<spinning_quad_renderer::Vertex>(), 32);
    assert_eq!(
        std::mem::offset_of!(spinning_quad_renderer::Vertex, uv),
        16
    );

    // Mat4 maps directly onto an MSL float4x4
    assert_eq!(std::mem::size_of::<Mat4>(), 64);
}

#[test]
fn test_vector_operations() {
    let x = Vec3::new(1.0, 0.0, 0.0);
    let y = Vec3::new(0.0, 1.0, 0.0);

    // Perpendicular vectors have zero dot product, and X cross Y is Z
    assert_eq!(x.dot(&y), 0.0);
    assert_eq!(x.cross(&y), Vec3::new(0.0, 0.0, 1.0));

    let v = Vec3::new(3.0, 0.0, 4.0);
    assert!((v.length() - 5.0).abs() < EPSILON);
    assert!((v.normalize().length() - 1.0).abs() < EPSILON);

    // Normalizing the zero vector stays zero instead of dividing by it
    assert_eq!(Vec3::zero().normalize(), Vec3::zero());
}

#[test]
fn test_matrix_identity_and_multiply() {
    let rotation = Mat4::rotation_y(0.7);

    // Multiplying by identity changes nothing
    assert_eq!(Mat4::identity().multiply(&rotation), rotation);
    assert_eq!(rotation.multiply(&Mat4::identity()), rotation);

    let point = Vec4::new(1.0, 2.0, 3.0, 1.0);
    let result = Mat4::identity().multiply_vec4(&point);
    assert_eq!(result, point);
}

#[test]
fn test_rotation_matrices() {
    // A quarter turn around Y takes +Z to +X
    let rotation = Mat4::rotation_y(std::f32::consts::FRAC_PI_2);
    let result = rotation.multiply_vec4(&Vec4::new(0.0, 0.0, 1.0, 1.0));
    assert!((result.x - 1.0).abs() < EPSILON);
    assert!(result.y.abs() < EPSILON);
    assert!(result.z.abs() < EPSILON);

    // A quarter turn around Z takes +X to +Y
    let rotation = Mat4::rotation_z(std::f32::consts::FRAC_PI_2);
    let result = rotation.multiply_vec4(&Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert!(result.x.abs() < EPSILON);
    assert!((result.y - 1.0).abs() < EPSILON);
    assert!(result.z.abs() < EPSILON);
}

#[test]
fn test_perspective_depth_range() {
    let near = 0.1;
    let far = 100.0;
    let projection = Mat4::perspective(std::f32::consts::FRAC_PI_4, 1.0, near, far);

    // A point on the near plane lands at depth 0 after the divide
    let on_near = projection.multiply_vec4(&Vec4::new(0.0, 0.0, -near, 1.0));
    assert!((on_near.z / on_near.w).abs() < EPSILON);

    // A point on the far plane lands at depth 1
    let on_far = projection.multiply_vec4(&Vec4::new(0.0, 0.0, -far, 1.0));
    assert!((on_far.z / on_far.w - 1.0).abs() < EPSILON);

    // Points in front of the camera keep a positive w
    assert!(on_near.w > 0.0);
    assert!(on_far.w > 0.0);
}

#[test]
fn test_look_at_matrix() {
    let view = Mat4::look_at(
        &Vec3::new(0.0, 0.0, 5.0),
        &Vec3::zero(),
        &Vec3::new(0.0, 1.0, 0.0),
    );

    // The target ends up on the view-space -Z axis
    let origin = view.multiply_vec4(&Vec4::new(0.0, 0.0, 0.0, 1.0));
    assert!(origin.x.abs() < EPSILON);
    assert!(origin.y.abs() < EPSILON);
    assert!((origin.z + 5.0).abs() < EPSILON);

    // The eye maps to the view-space origin
    let eye = view.multiply_vec4(&Vec4::new(0.0, 0.0, 5.0, 1.0));
    assert!(eye.x.abs() < EPSILON);
    assert!(eye.y.abs() < EPSILON);
    assert!(eye.z.abs() < EPSILON);
}

#[test]
fn test_mvp_matrix() {
    let mvp = spinning_quad_renderer::mvp_matrix(800.0 / 600.0, 0.0);
    assert_ne!(mvp, Mat4::identity());

    // The quad center sits in front of the camera at every time
    for &time in &[0.0, 0.5, 2.0] {
        let mvp = spinning_quad_renderer::mvp_matrix(1.0, time);
        let center = mvp.multiply_vec4(&Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert!(center.w > 0.0);
    }

    // The spin actually changes the transform over time
    let early = spinning_quad_renderer::mvp_matrix(1.0, 0.0);
    let late = spinning_quad_renderer::mvp_matrix(1.0, 1.0);
    assert_ne!(early, late);
}

#[test]
fn test_msaa_sample_count() {
    assert_eq!(spinning_quad_renderer::MSAA_SAMPLE_COUNT, 4);
}

#[test]
fn test_texture_format() {
    assert_eq!(TextureFormat::Rgba8.bytes_per_pixel(), 4);
    assert_eq!(TextureFormat::Bgra8.bytes_per_pixel(), 4);

    // A 64x64 RGBA image occupies 16 KiB
    assert_eq!(TextureFormat::Rgba8.byte_len(64, 64), 16384);
    assert_eq!(TextureFormat::Rgba8.byte_len(0, 64), 0);
}

#[test]
fn test_timer() {
    let mut timer = Timer::new();

    let delta = timer.delta();
    assert!(delta >= 0.0);

    // Elapsed time never goes backwards
    let first = timer.elapsed();
    let second = timer.elapsed();
    assert!(second >= first);
}
