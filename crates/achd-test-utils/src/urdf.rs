//! URDF fixtures.
//!
//! Link masses and offsets are chosen so closed-form dynamics are easy to
//! write down in tests: inertia tensors are zero wherever a point mass is
//! enough.

use std::io;
use std::path::PathBuf;

/// Single revolute joint about +z at the base origin. One 2 kg point mass
/// 0.5 m along the link's +x axis.
pub const PENDULUM: &str = r#"
    <robot name="pendulum">
        <link name="base"/>
        <link name="pendulum">
            <inertial>
                <origin xyz="0.5 0 0"/>
                <mass value="2.0"/>
                <inertia ixx="0" ixy="0" ixz="0" iyy="0" iyz="0" izz="0"/>
            </inertial>
        </link>
        <joint name="hinge" type="revolute">
            <parent link="base"/><child link="pendulum"/>
            <origin xyz="0 0 0"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="50" velocity="10"/>
        </joint>
    </robot>
"#;

/// [`PENDULUM`] mounted 0.5 m above the base with a massless tool frame
/// fixed 1 m along the link's +x axis.
pub const PENDULUM_WITH_TOOL: &str = r#"
    <robot name="pendulum_with_tool">
        <link name="base"/>
        <link name="pendulum">
            <inertial>
                <origin xyz="0.5 0 0"/>
                <mass value="2.0"/>
                <inertia ixx="0" ixy="0" ixz="0" iyy="0" iyz="0" izz="0"/>
            </inertial>
        </link>
        <link name="tool"/>
        <joint name="hinge" type="revolute">
            <parent link="base"/><child link="pendulum"/>
            <origin xyz="0 0 0.5"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="50" velocity="10"/>
        </joint>
        <joint name="tool_mount" type="fixed">
            <parent link="pendulum"/><child link="tool"/>
            <origin xyz="1 0 0"/>
        </joint>
    </robot>
"#;

/// Planar two-link arm in the base xy plane. Both links are 1 m long with a
/// 1 kg point mass at their far end; the tool frame sits at the end of
/// `link2`.
pub const TWO_LINK_PLANAR: &str = r#"
    <robot name="two_link_planar">
        <link name="base"/>
        <link name="link1">
            <inertial>
                <origin xyz="1 0 0"/>
                <mass value="1.0"/>
                <inertia ixx="0" ixy="0" ixz="0" iyy="0" iyz="0" izz="0"/>
            </inertial>
        </link>
        <link name="link2">
            <inertial>
                <origin xyz="1 0 0"/>
                <mass value="1.0"/>
                <inertia ixx="0" ixy="0" ixz="0" iyy="0" iyz="0" izz="0"/>
            </inertial>
        </link>
        <link name="tool"/>
        <joint name="shoulder" type="revolute">
            <parent link="base"/><child link="link1"/>
            <origin xyz="0 0 0"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="50" velocity="10"/>
        </joint>
        <joint name="elbow" type="revolute">
            <parent link="link1"/><child link="link2"/>
            <origin xyz="1 0 0"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="50" velocity="10"/>
        </joint>
        <joint name="tool_mount" type="fixed">
            <parent link="link2"/><child link="tool"/>
            <origin xyz="1 0 0"/>
        </joint>
    </robot>
"#;

/// Six revolute joints stacked along +z, ending in a fixed `tool_frame`.
pub const SIX_DOF_ARM: &str = r#"
    <robot name="six_dof_arm">
        <link name="base"><inertial><mass value="20.0"/><inertia ixx="0.5" ixy="0" ixz="0" iyy="0.5" iyz="0" izz="0.5"/></inertial></link>
        <link name="shoulder_link"><inertial><origin xyz="0 0 0.1"/><mass value="3.0"/><inertia ixx="0.02" ixy="0" ixz="0" iyy="0.02" iyz="0" izz="0.005"/></inertial></link>
        <link name="upper_arm"><inertial><origin xyz="0 0 0.15"/><mass value="2.5"/><inertia ixx="0.015" ixy="0" ixz="0" iyy="0.015" iyz="0" izz="0.003"/></inertial></link>
        <link name="elbow_link"><inertial><origin xyz="0 0 0.05"/><mass value="1.5"/><inertia ixx="0.005" ixy="0" ixz="0" iyy="0.005" iyz="0" izz="0.002"/></inertial></link>
        <link name="forearm"><inertial><origin xyz="0 0 0.1"/><mass value="1.0"/><inertia ixx="0.003" ixy="0" ixz="0" iyy="0.003" iyz="0" izz="0.001"/></inertial></link>
        <link name="wrist_link"><inertial><origin xyz="0 0 0.03"/><mass value="0.5"/><inertia ixx="0.001" ixy="0" ixz="0" iyy="0.001" iyz="0" izz="0.0005"/></inertial></link>
        <link name="end_effector"><inertial><origin xyz="0 0 0.02"/><mass value="0.2"/><inertia ixx="0.0002" ixy="0" ixz="0" iyy="0.0002" iyz="0" izz="0.0002"/></inertial></link>
        <link name="tool_frame"/>
        <joint name="j1_base_yaw" type="revolute">
            <parent link="base"/><child link="shoulder_link"/>
            <origin xyz="0 0 0.05"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="80" velocity="2"/>
        </joint>
        <joint name="j2_shoulder_pitch" type="revolute">
            <parent link="shoulder_link"/><child link="upper_arm"/>
            <origin xyz="0 0 0.2"/><axis xyz="0 1 0"/>
            <limit lower="-1.5708" upper="2.356" effort="60" velocity="2"/>
        </joint>
        <joint name="j3_elbow_pitch" type="revolute">
            <parent link="upper_arm"/><child link="elbow_link"/>
            <origin xyz="0 0 0.3"/><axis xyz="0 1 0"/>
            <limit lower="-2.356" upper="2.356" effort="40" velocity="3"/>
        </joint>
        <joint name="j4_forearm_roll" type="revolute">
            <parent link="elbow_link"/><child link="forearm"/>
            <origin xyz="0 0 0.1"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="20" velocity="5"/>
        </joint>
        <joint name="j5_wrist_pitch" type="revolute">
            <parent link="forearm"/><child link="wrist_link"/>
            <origin xyz="0 0 0.2"/><axis xyz="0 1 0"/>
            <limit lower="-2.094" upper="2.094" effort="10" velocity="5"/>
        </joint>
        <joint name="j6_wrist_roll" type="revolute">
            <parent link="wrist_link"/><child link="end_effector"/>
            <origin xyz="0 0 0.06"/><axis xyz="0 0 1"/>
            <limit lower="-3.14159" upper="3.14159" effort="5" velocity="8"/>
        </joint>
        <joint name="tool_mount" type="fixed">
            <parent link="end_effector"/><child link="tool_frame"/>
            <origin xyz="0 0 0.04"/>
        </joint>
    </robot>
"#;

/// Write `xml` to `<temp_dir>/achd-fixtures/<name>.urdf` and return the path.
///
/// Loaders and configuration code take paths, so tests that exercise them
/// materialise a fixture first.
pub fn write_fixture(name: &str, xml: &str) -> io::Result<PathBuf> {
    let dir = std::env::temp_dir().join("achd-fixtures");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{name}.urdf"));
    std::fs::write(&path, xml)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_well_formed_robots() {
        for xml in [PENDULUM, PENDULUM_WITH_TOOL, TWO_LINK_PLANAR, SIX_DOF_ARM] {
            assert!(xml.trim_start().starts_with("<robot"));
            assert!(xml.trim_end().ends_with("</robot>"));
        }
    }

    #[test]
    fn write_fixture_round_trips() {
        let path = write_fixture("test_utils_pendulum", PENDULUM).unwrap();
        assert!(path.ends_with("achd-fixtures/test_utils_pendulum.urdf"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PENDULUM);
        std::fs::remove_file(path).unwrap();
    }
}
