use crate::models::FloatType;
use crate::solver::improvement::local_search::route_cost;
use crate::solver::improvement::{LinkNode, LocalSearch, Move};

pub struct RelocateSingle;

impl Move for RelocateSingle {
    fn move_name(&self) -> &'static str {
        "RelocateSingle"
    }
    unsafe fn delta(&self, ls: &LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) -> FloatType {
        let u = &*u_rc;
        let u_pred = &*u.predecessor;
        let x = &*u.successor;
        let v = &*v_rc;
        let y = &*v.successor;

        let r1 = u.route;
        let r2 = v.route;

        if y.number == u.number {
            return 0.0;
        }

        let distance_one = (*r1).distance as i64 - ls.distance(r1, u_pred.number, u.number)
            - ls.distance(r1, u.number, x.number)
            + ls.distance(r1, u_pred.number, x.number);

        let distance_two = (*r2).distance as i64 - ls.distance(r2, v.number, y.number)
            + ls.distance(r2, v.number, u.number)
            + ls.distance(r2, u.number, y.number);

        let mut overload_one = (*r1).overload as i64;
        let mut overload_two = (*r2).overload as i64;

        if (*r1).index != (*r2).index {
            let u_demand = ls.ctx.problem.location(u.number).demand;
            overload_one -= u_demand;
            overload_two += u_demand;
        }

        let old_cost = (*r1).cost + (*r2).cost;
        let new_cost = route_cost(distance_one, overload_one, ls.evaluator.load_penalty)
            + route_cost(distance_two, overload_two, ls.evaluator.load_penalty);

        new_cost - old_cost
    }

    unsafe fn perform(&self, ls: &mut LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) {
        let r1 = (*u_rc).route;
        let r2 = (*v_rc).route;

        let u_pred_rc = (*u_rc).predecessor;
        let x_rc = (*u_rc).successor;
        let y_rc = (*v_rc).successor;

        LinkNode::link_nodes(u_pred_rc, x_rc);
        LinkNode::link_nodes(v_rc, u_rc);
        LinkNode::link_nodes(u_rc, y_rc);

        ls.update_route(r1);
        if (*r1).index != (*r2).index {
            ls.update_route(r2);
        }
    }
}

pub struct RelocateDouble;

impl Move for RelocateDouble {
    fn move_name(&self) -> &'static str {
        "RelocateDouble"
    }
    unsafe fn delta(&self, ls: &LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) -> FloatType {
        let u = &*u_rc;
        let u_pred = &*u.predecessor;
        let x = &*u.successor;

        if x.is_depot() {
            return 0.0;
        }
        let x_next = &*x.successor;

        let v = &*v_rc;
        let y = &*v.successor;

        let r1 = u.route;
        let r2 = v.route;

        if u.number == y.number || v.number == x.number {
            return 0.0;
        }

        let distance_one = (*r1).distance as i64
            - ls.distance(r1, u_pred.number, u.number)
            - ls.distance(r1, u.number, x.number)
            - ls.distance(r1, x.number, x_next.number)
            + ls.distance(r1, u_pred.number, x_next.number);

        let distance_two = (*r2).distance as i64 - ls.distance(r2, v.number, y.number)
            + ls.distance(r2, v.number, u.number)
            + ls.distance(r2, u.number, x.number)
            + ls.distance(r2, x.number, y.number);

        let mut overload_one = (*r1).overload as i64;
        let mut overload_two = (*r2).overload as i64;

        if (*r1).index != (*r2).index {
            let u_demand = ls.ctx.problem.location(u.number).demand;
            let x_demand = ls.ctx.problem.location(x.number).demand;
            overload_one -= u_demand + x_demand;
            overload_two += u_demand + x_demand;
        }

        let old_cost = (*r1).cost + (*r2).cost;
        let new_cost = route_cost(distance_one, overload_one, ls.evaluator.load_penalty)
            + route_cost(distance_two, overload_two, ls.evaluator.load_penalty);

        new_cost - old_cost
    }

    unsafe fn perform(&self, ls: &mut LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) {
        let r1 = (*u_rc).route;
        let r2 = (*v_rc).route;

        let u_prev_rc = (*u_rc).predecessor;
        let x_rc = (*u_rc).successor;
        let x_next_rc = (*x_rc).successor;
        let y_rc = (*v_rc).successor;

        LinkNode::link_nodes(u_prev_rc, x_next_rc);
        LinkNode::link_nodes(v_rc, u_rc);
        LinkNode::link_nodes(x_rc, y_rc);

        ls.update_route(r1);
        if (*r1).index != (*r2).index {
            ls.update_route(r2);
        }
    }
}

pub struct RelocateDoubleReverse;

impl Move for RelocateDoubleReverse {
    fn move_name(&self) -> &'static str {
        "RelocateDoubleReverse"
    }
    unsafe fn delta(&self, ls: &LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) -> FloatType {
        let u = &*u_rc;
        let u_prev = &*u.predecessor;
        let x = &*u.successor;

        if x.is_depot() {
            return 0.0;
        }
        let x_next = &*x.successor;

        let v = &*v_rc;
        let y = &*v.successor;

        let r1 = u.route;
        let r2 = v.route;

        if u.number == y.number || v.number == x.number {
            return 0.0;
        }

        let distance_one = (*r1).distance as i64
            - ls.distance(r1, u_prev.number, u.number)
            - ls.distance(r1, u.number, x.number)
            - ls.distance(r1, x.number, x_next.number)
            + ls.distance(r1, u_prev.number, x_next.number);

        let distance_two = (*r2).distance as i64 - ls.distance(r2, v.number, y.number)
            + ls.distance(r2, v.number, x.number)
            + ls.distance(r2, x.number, u.number)
            + ls.distance(r2, u.number, y.number);

        let mut overload_one = (*r1).overload as i64;
        let mut overload_two = (*r2).overload as i64;

        if (*r1).index != (*r2).index {
            let u_demand = ls.ctx.problem.location(u.number).demand;
            let x_demand = ls.ctx.problem.location(x.number).demand;
            overload_one -= u_demand + x_demand;
            overload_two += u_demand + x_demand;
        }

        let old_cost = (*r1).cost + (*r2).cost;
        let new_cost = route_cost(distance_one, overload_one, ls.evaluator.load_penalty)
            + route_cost(distance_two, overload_two, ls.evaluator.load_penalty);

        new_cost - old_cost
    }

    unsafe fn perform(&self, ls: &mut LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) {
        let r1 = (*u_rc).route;
        let r2 = (*v_rc).route;

        let u_prev_rc = (*u_rc).predecessor;
        let x_rc = (*u_rc).successor;
        let x_next_rc = (*x_rc).successor;
        let y_rc = (*v_rc).successor;

        LinkNode::link_nodes(u_prev_rc, x_next_rc);
        LinkNode::link_nodes(v_rc, x_rc);
        LinkNode::link_nodes(x_rc, u_rc);
        LinkNode::link_nodes(u_rc, y_rc);

        ls.update_route(r1);
        if (*r1).index != (*r2).index {
            ls.update_route(r2);
        }
    }
}

/// Moves two consecutive clients (u, x) to after v, reversing their order,
/// as a standalone operator distinct from `RelocateDoubleReverse`'s depot
/// handling path (kept for parity with the teacher's move catalogue; the
/// two share logic but are registered independently per config toggle).
pub struct MoveTwoClientsReversed;

impl Move for MoveTwoClientsReversed {
    fn move_name(&self) -> &'static str {
        "MoveTwoClientsReversed"
    }
    unsafe fn delta(&self, ls: &LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) -> FloatType {
        RelocateDoubleReverse.delta(ls, u_rc, v_rc)
    }
    unsafe fn perform(&self, ls: &mut LocalSearch, u_rc: *mut LinkNode, v_rc: *mut LinkNode) {
        RelocateDoubleReverse.perform(ls, u_rc, v_rc)
    }
}
