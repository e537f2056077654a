// src/coords/mod.rs

//! Cube-face coordinate systems.

pub mod stuv;

pub use stuv::{
  face_siti_to_xyz, face_uv_to_xyz, face_xyz_to_uv, face_xyz_to_uvw, ij_to_st_min, siti_to_st, st_to_ij, st_to_siti,
  st_to_uv, u_axis, u_norm, unit_norm, uv_to_st, v_axis, v_norm, valid_face_xyz_to_uv, xyz_to_face_siti,
  xyz_to_face_uv,
};
