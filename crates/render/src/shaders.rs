/// GLSL vertex shader for textured meshes: position + texcoord, full MVP.
pub const TEXTURED_VERTEX: &str = r#"#version 330 core
layout (location = 0) in vec3 aPosition;
layout (location = 1) in vec2 aTexCoord;

out vec2 texCoord;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

void main()
{
    texCoord = aTexCoord;
    gl_Position = projection * view * model * vec4(aPosition, 1.0);
}
"#;

/// GLSL fragment shader blending two textures sampled at the same coordinate.
pub const TEXTURED_FRAGMENT: &str = r#"#version 330 core
out vec4 outputColor;

in vec2 texCoord;

uniform sampler2D texture0;
uniform sampler2D texture1;

void main()
{
    outputColor = mix(texture(texture0, texCoord), texture(texture1, texCoord), 0.2);
}
"#;

/// GLSL vertex shader for untextured meshes.
pub const FLAT_VERTEX: &str = r#"#version 330 core
layout (location = 0) in vec3 aPosition;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

void main()
{
    gl_Position = projection * view * model * vec4(aPosition, 1.0);
}
"#;

/// GLSL fragment shader writing a single uniform color.
pub const FLAT_FRAGMENT: &str = r#"#version 330 core
out vec4 outputColor;

uniform vec3 color;

void main()
{
    outputColor = vec4(color, 1.0);
}
"#;
