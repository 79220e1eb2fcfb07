//! The ibverbs call vocabulary.

/// Known verb names in chart/table priority order: resource setup first,
/// then the data path, then teardown. Logs may contain other `ibv_*` names;
/// those are histogrammed but excluded from the summary outputs.
pub const IBV_VERBS: [&str; 17] = [
    "ibv_get_device_list",
    "ibv_open_device",
    "ibv_alloc_pd",
    "ibv_create_cq",
    "ibv_reg_mr",
    "ibv_create_qp",
    "ibv_modify_qp(init)",
    "ibv_post_recv",
    "ibv_modify_qp(rtr)",
    "ibv_modify_qp(rts)",
    "ibv_post_send",
    "ibv_poll_cq",
    "ibv_destroy_qp",
    "ibv_dereg_mr",
    "ibv_destroy_cq",
    "ibv_dealloc_pd",
    "ibv_close_device",
];
